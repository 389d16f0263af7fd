/// Worker pool sizing for the fuzzy stage

/// Available CPUs minus one, leaving a core for the coordinating thread.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Dedicated pool so the fuzzy stage never competes with the global pool.
pub fn build_worker_pool(workers: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    let workers = if workers == 0 {
        default_worker_count()
    } else {
        workers
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("taxbridge-worker-{}", i))
        .build()
}

/// Number of batches needed to cover `total` items.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total.div_ceil(batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_worker_count_is_positive() {
        assert!(default_worker_count() >= 1);
    }

    #[test]
    fn test_build_worker_pool() {
        let pool = build_worker_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);

        let pool = build_worker_pool(0).unwrap();
        assert_eq!(pool.current_num_threads(), default_worker_count());
    }

    #[test_case(0, 1000 => 0)]
    #[test_case(1, 1000 => 1)]
    #[test_case(1000, 1000 => 1)]
    #[test_case(1001, 1000 => 2)]
    #[test_case(2500, 1000 => 3)]
    #[test_case(10, 0 => 0)]
    fn test_batch_count(total: usize, batch_size: usize) -> usize {
        batch_count(total, batch_size)
    }
}
