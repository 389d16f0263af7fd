use pretty_assertions::assert_eq;
use rstest::rstest;
use taxbridge::bio::taxonomy::{
    Ancestry, CandidateTaxon, Classification, MajorRank, MatchType, SourceTaxon, TaxonomicStatus,
};
use taxbridge::core::fuzzy::resolve_homonyms;
use taxbridge::core::lineage::LineageIndex;
use taxbridge::{Config, CrosswalkResolver};

fn resolve(taxa: Vec<SourceTaxon>, candidates: &[CandidateTaxon], fuzzy: bool) -> Vec<(i64, String, MatchType, f64)> {
    let mut config = Config::default();
    config.matching.fuzzy_enabled = fuzzy;
    config.performance.workers = Some(1);
    CrosswalkResolver::new(config)
        .with_silent(true)
        .resolve(taxa, candidates)
        .unwrap()
        .records
        .into_iter()
        .map(|r| (r.source_taxon_id, r.candidate_id, r.match_type, r.match_score))
        .collect()
}

#[rstest]
#[case("species", MatchType::ExactNameRankAccepted, 1.0)]
#[case("subspecies", MatchType::ExactNameOnlyAccepted, 0.95)]
fn test_honey_bee_scenarios(#[case] candidate_rank: &str, #[case] expected: MatchType, #[case] score: f64) {
    let candidates = vec![CandidateTaxon::new(
        "C1",
        "Apis mellifera",
        candidate_rank,
        TaxonomicStatus::Accepted,
    )];
    let records = resolve(vec![SourceTaxon::new(1, "Apis mellifera", "species")], &candidates, false);
    assert_eq!(records, vec![(1, "C1".to_string(), expected, score)]);
}

#[test]
fn test_bombus_highest_score_without_lineage() {
    let source = SourceTaxon::new(52775, "Bombus sp", "species");
    let bombus = CandidateTaxon::new("B", "Bombus spp", "species", TaxonomicStatus::Accepted);
    let vombus = CandidateTaxon::new("V", "Vombus sp", "species", TaxonomicStatus::Accepted);
    let scored = vec![(&bombus, 95.0), (&vombus, 91.0)];

    let record = resolve_homonyms(&source, &scored, &LineageIndex::default(), 89.0).unwrap();
    assert_eq!(record.candidate_name, "Bombus spp");
    assert_eq!(record.match_type, MatchType::FuzzyNameHighestScore);
    assert!((record.match_score - 0.95).abs() < 1e-9);
}

#[test]
fn test_genus_agreement_wins_tie() {
    let source = SourceTaxon::new(7, "Aus bus", "species").with_ancestry(
        Ancestry::new()
            .with(MajorRank::Genus, Some(70), Some("Aus"))
            .with(MajorRank::Family, Some(71), Some("Aidae"))
            .with(MajorRank::Order, Some(72), Some("Aales")),
    );

    let mut genus_only = Classification::default();
    genus_only.genus = Some("Aus".to_string());
    genus_only.family = Some("Zidae".to_string());
    genus_only.order = Some("Zales".to_string());
    let mut family_only = Classification::default();
    family_only.genus = Some("Zus".to_string());
    family_only.family = Some("Aidae".to_string());

    let g = CandidateTaxon::new("G", "Aus bus", "species", TaxonomicStatus::Accepted)
        .with_classification(genus_only);
    let f = CandidateTaxon::new("F", "Aus bus", "species", TaxonomicStatus::Accepted)
        .with_classification(family_only);
    let index = LineageIndex::build(std::slice::from_ref(&source), &[f.clone(), g.clone()]);

    let record = resolve_homonyms(&source, &[(&f, 93.0), (&g, 93.0)], &index, 89.0).unwrap();
    assert_eq!(record.candidate_id, "G");
    assert_eq!(record.match_type, MatchType::FuzzyNameWithAncestors);
}

#[test]
fn test_single_survivor_needs_no_lineage() {
    let candidates = vec![CandidateTaxon::new(
        "C2",
        "Bombus spp",
        "species",
        TaxonomicStatus::Accepted,
    )];
    let records = resolve(vec![SourceTaxon::new(52775, "Bombus sp", "species")], &candidates, true);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].2, MatchType::FuzzyNameSingleMatch);
}

#[test]
fn test_fuzzy_disabled_leaves_residual_unmatched() {
    let candidates = vec![CandidateTaxon::new(
        "C2",
        "Bombus spp",
        "species",
        TaxonomicStatus::Accepted,
    )];
    let records = resolve(vec![SourceTaxon::new(52775, "Bombus sp", "species")], &candidates, false);
    assert!(records.is_empty());
}
