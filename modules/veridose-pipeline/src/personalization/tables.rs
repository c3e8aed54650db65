//! Biomarker and genotype rule tables for rules-mode personalization.
//!
//! Each biomarker rule fires when the user's lab value crosses its
//! threshold AND the ingredient list contains one of the rule's compounds;
//! the signed delta then moves the personal score. Genotype rules fire on
//! specific genotypes and carry separate indicated / contraindicated
//! compound lists.

/// Which side of the threshold triggers the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Below,
    Above,
}

impl Direction {
    pub fn triggered(&self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::Below => value < threshold,
            Direction::Above => value > threshold,
        }
    }
}

pub struct BiomarkerRule {
    /// Human-readable marker name for bullets.
    pub label: &'static str,
    /// Keys this marker may appear under in a flattened lab panel.
    pub aliases: &'static [&'static str],
    pub direction: Direction,
    pub threshold: f64,
    pub unit: &'static str,
    /// Ingredient-name substrings that count as a match.
    pub compounds: &'static [&'static str],
    pub delta: i32,
}

pub struct GenotypeRule {
    pub rsid: &'static str,
    pub gene: &'static str,
    pub variant: &'static str,
    /// Normalized genotypes (alleles uppercased and sorted) this rule fires on.
    pub genotypes: &'static [&'static str],
    pub indicated: &'static [&'static str],
    pub indicated_delta: i32,
    pub indicated_why: &'static str,
    pub contraindicated: &'static [&'static str],
    pub contraindicated_delta: i32,
    pub contraindicated_why: &'static str,
}

pub const BIOMARKER_RULES: &[BiomarkerRule] = &[
    BiomarkerRule {
        label: "vitamin D",
        aliases: &["vitamin_d", "vitamin_d_25_oh", "25_oh_vitamin_d"],
        direction: Direction::Below,
        threshold: 30.0,
        unit: "ng/mL",
        compounds: &["vitamin d", "cholecalciferol", "d3"],
        delta: 10,
    },
    BiomarkerRule {
        label: "ferritin",
        aliases: &["ferritin"],
        direction: Direction::Below,
        threshold: 30.0,
        unit: "ng/mL",
        compounds: &["iron", "ferrous"],
        delta: 10,
    },
    BiomarkerRule {
        label: "ferritin",
        aliases: &["ferritin"],
        direction: Direction::Above,
        threshold: 300.0,
        unit: "ng/mL",
        compounds: &["iron", "ferrous"],
        delta: -15,
    },
    BiomarkerRule {
        label: "magnesium",
        aliases: &["magnesium", "magnesium_serum", "magnesium_rbc"],
        direction: Direction::Below,
        threshold: 1.8,
        unit: "mg/dL",
        compounds: &["magnesium"],
        delta: 10,
    },
    BiomarkerRule {
        label: "vitamin B12",
        aliases: &["vitamin_b12", "b12", "cobalamin"],
        direction: Direction::Below,
        threshold: 400.0,
        unit: "pg/mL",
        compounds: &["b12", "cobalamin", "methylcobalamin"],
        delta: 10,
    },
    BiomarkerRule {
        label: "folate",
        aliases: &["folate", "folate_serum"],
        direction: Direction::Below,
        threshold: 4.0,
        unit: "ng/mL",
        compounds: &["folate", "folic acid", "methylfolate"],
        delta: 8,
    },
    BiomarkerRule {
        label: "homocysteine",
        aliases: &["homocysteine"],
        direction: Direction::Above,
        threshold: 15.0,
        unit: "µmol/L",
        compounds: &["methylfolate", "b12", "betaine", "tmg"],
        delta: 8,
    },
    BiomarkerRule {
        label: "hs-CRP",
        aliases: &["hs_crp", "crp", "c_reactive_protein"],
        direction: Direction::Above,
        threshold: 3.0,
        unit: "mg/L",
        compounds: &["omega-3", "fish oil", "epa", "dha", "curcumin"],
        delta: 8,
    },
    BiomarkerRule {
        label: "LDL cholesterol",
        aliases: &["ldl", "ldl_cholesterol"],
        direction: Direction::Above,
        threshold: 160.0,
        unit: "mg/dL",
        compounds: &["plant sterol", "psyllium", "red yeast rice"],
        delta: 6,
    },
    BiomarkerRule {
        label: "zinc",
        aliases: &["zinc", "zinc_serum"],
        direction: Direction::Below,
        threshold: 70.0,
        unit: "µg/dL",
        compounds: &["zinc"],
        delta: 8,
    },
];

pub const GENOTYPE_RULES: &[GenotypeRule] = &[
    GenotypeRule {
        rsid: "rs1801133",
        gene: "MTHFR",
        variant: "C677T",
        genotypes: &["CT", "TT"],
        indicated: &["methylfolate", "5-mthf", "methylcobalamin"],
        indicated_delta: 10,
        indicated_why: "pre-methylated folate bypasses your reduced MTHFR enzyme activity",
        contraindicated: &["folic acid"],
        contraindicated_delta: -8,
        contraindicated_why: "synthetic folic acid is poorly converted with this variant and can accumulate unmetabolized",
    },
    GenotypeRule {
        rsid: "rs4680",
        gene: "COMT",
        variant: "V158M",
        genotypes: &["AA"],
        indicated: &[],
        indicated_delta: 0,
        indicated_why: "",
        contraindicated: &["caffeine", "guarana", "green tea extract"],
        contraindicated_delta: -10,
        contraindicated_why: "slow COMT clearance makes stimulants linger, commonly amplifying anxiety and sleep disruption",
    },
    GenotypeRule {
        rsid: "rs4680",
        gene: "COMT",
        variant: "V158M",
        genotypes: &["GG"],
        indicated: &["tyrosine", "l-tyrosine"],
        indicated_delta: 5,
        indicated_why: "fast COMT clearance depletes catecholamines, which tyrosine helps replenish",
        contraindicated: &[],
        contraindicated_delta: 0,
        contraindicated_why: "",
    },
    GenotypeRule {
        rsid: "rs1800562",
        gene: "HFE",
        variant: "C282Y",
        genotypes: &["AA"],
        indicated: &[],
        indicated_delta: 0,
        indicated_why: "",
        contraindicated: &["iron", "ferrous"],
        contraindicated_delta: -20,
        contraindicated_why: "this hemochromatosis-risk genotype already over-absorbs iron; supplemental iron should be avoided",
    },
    GenotypeRule {
        rsid: "rs1799945",
        gene: "HFE",
        variant: "H63D",
        genotypes: &["GG"],
        indicated: &[],
        indicated_delta: 0,
        indicated_why: "",
        contraindicated: &["iron", "ferrous"],
        contraindicated_delta: -12,
        contraindicated_why: "homozygous H63D raises iron-overload risk; supplemental iron is not advised without monitoring",
    },
    GenotypeRule {
        rsid: "rs429358",
        gene: "APOE",
        variant: "ε4",
        genotypes: &["CT", "CC"],
        indicated: &["dha", "omega-3", "fish oil"],
        indicated_delta: 8,
        indicated_why: "ε4 carriers show the strongest cognitive benefit from consistent DHA intake",
        contraindicated: &[],
        contraindicated_delta: 0,
        contraindicated_why: "",
    },
    GenotypeRule {
        rsid: "rs174537",
        gene: "FADS1",
        variant: "",
        genotypes: &["GT", "TT"],
        indicated: &["epa", "dha", "fish oil"],
        indicated_delta: 8,
        indicated_why: "reduced FADS1 activity limits conversion of plant omega-3s, so preformed EPA/DHA matters more",
        contraindicated: &[],
        contraindicated_delta: 0,
        contraindicated_why: "",
    },
    GenotypeRule {
        rsid: "rs762551",
        gene: "CYP1A2",
        variant: "",
        genotypes: &["AC", "CC"],
        indicated: &[],
        indicated_delta: 0,
        indicated_why: "",
        contraindicated: &["caffeine", "guarana"],
        contraindicated_delta: -12,
        contraindicated_why: "slow caffeine metabolism with this genotype is linked to elevated cardiovascular strain from stimulants",
    },
];

/// First compound from `compounds` that appears as a substring of any
/// lowercased ingredient name.
pub fn first_matching_compound(
    ingredient_names: &[String],
    compounds: &[&'static str],
) -> Option<&'static str> {
    compounds
        .iter()
        .find(|compound| ingredient_names.iter().any(|name| name.contains(*compound)))
        .copied()
}
