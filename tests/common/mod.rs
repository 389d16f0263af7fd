//! Shared fixtures for taxbridge integration tests
//!
//! The fixture taxonomy covers every path through the resolver: exact
//! name+rank matches, a misspelling only the fuzzy stage resolves, a
//! homonym pair split by lineage, an inactive taxon, and a name with no
//! counterpart at all.
#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        TestEnvironment {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Write `rows` (already tab-joined) under a header line.
    pub fn write_tsv(&self, name: &str, header: &[&str], rows: &[Vec<&str>]) -> PathBuf {
        let mut contents = header.join("\t");
        contents.push('\n');
        for row in rows {
            contents.push_str(&row.join("\t"));
            contents.push('\n');
        }
        let path = self.path(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    pub fn expanded_taxa(&self) -> PathBuf {
        self.write_tsv(
            "expanded_taxa.tsv",
            &[
                "taxonID", "name", "rank", "taxonActive",
                "L20_taxonID", "L20_name", "L30_taxonID", "L30_name", "L40_taxonID", "L40_name",
            ],
            &[
                vec!["47219", "Apis mellifera", "species", "true", "47220", "Apis", "47221", "Apidae", "47201", "Hymenoptera"],
                vec!["47220", "Apis", "genus", "true", "", "", "47221", "Apidae", "47201", "Hymenoptera"],
                vec!["47221", "Apidae", "family", "true", "", "", "", "", "47201", "Hymenoptera"],
                vec!["52775", "Bombus sp", "species", "true", "", "", "", "", "", ""],
                vec!["12", "Moruss", "genus", "true", "", "", "71", "Sulidae", "72", "Suliformes"],
                vec!["5000", "Quercus robur", "species", "true", "", "", "", "", "", ""],
                vec!["99", "Extinctus oldus", "species", "false", "", "", "", "", "", ""],
            ],
        )
    }

    pub fn name_usage(&self) -> PathBuf {
        self.write_tsv(
            "NameUsage.tsv",
            &[
                "col:ID", "col:scientificName", "col:rank", "col:status",
                "col:genericName", "col:family", "col:order", "col:class", "col:phylum",
            ],
            &[
                vec!["C1", "Apis mellifera", "species", "accepted", "Apis", "Apidae", "Hymenoptera", "Insecta", "Arthropoda"],
                vec!["C1s", "Apis mellifera", "species", "synonym", "Apis", "Apidae", "Hymenoptera", "Insecta", "Arthropoda"],
                vec!["G1", "Apis", "genus", "accepted", "", "Apidae", "Hymenoptera", "Insecta", "Arthropoda"],
                vec!["F1", "Apidae", "family", "accepted", "", "", "Hymenoptera", "Insecta", "Arthropoda"],
                vec!["C3", "Bombus spp", "species", "accepted", "Bombus", "Apidae", "Hymenoptera", "Insecta", "Arthropoda"],
                vec!["MP", "Morus", "genus", "accepted", "", "Moraceae", "Rosales", "Magnoliopsida", "Tracheophyta"],
                vec!["MB", "Morus", "genus", "accepted", "", "Sulidae", "Suliformes", "Aves", "Chordata"],
                vec!["X1", "Extinctus oldus", "species", "accepted", "", "", "", "", ""],
            ],
        )
    }

    pub fn vernacular(&self) -> PathBuf {
        self.write_tsv(
            "VernacularName.tsv",
            &["col:taxonID", "col:name", "col:language", "col:preferred"],
            &[
                vec!["C1", "Western honey bee", "eng", "true"],
                vec!["C1", "European honey bee", "eng", "true"],
                vec!["C1", "Abeille mellifère", "fra", "true"],
                vec!["G1", "Honey bees", "eng", "true"],
                vec!["F1", "Bees", "eng", "true"],
                vec!["C3", "Bumble bees", "eng", "false"],
                vec!["MB", "Gannets", "eng", "true"],
            ],
        )
    }
}
