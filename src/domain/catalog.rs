// ============================================================
// Layer 3 — UEA Dataset Catalogue
// ============================================================
// Names of the multivariate UEA archive datasets the drivers know
// about, plus the groupings the ablation suites iterate over.

/// Every dataset the loader accepts.
pub const VALID_DATASET_NAMES: &[&str] = &[
    "ArticularyWordRecognition",
    "FaceDetection",
    "NATOPS",
    "AtrialFibrillation",
    "FingerMovements",
    "PEMS-SF",
    "BasicMotions",
    "HandMovementDirection",
    "PenDigits",
    "CharacterTrajectories",
    "Handwriting",
    "PhonemeSpectra",
    "Cricket",
    "Heartbeat",
    "RacketSports",
    "DuckDuckGeese",
    "InsectWingbeat",
    "SelfRegulationSCP1",
    "EigenWorms",
    "JapaneseVowels",
    "SelfRegulationSCP2",
    "Epilepsy",
    "Libras",
    "SpokenArabicDigits",
    "ERing",
    "LSST",
    "StandWalkJump",
    "EthanolConcentration",
    "MotorImagery",
    "UWaveGestureLibrary",
];

pub const LONG_DATASETS: &[&str] = &[
    "EigenWorms",
    "MotorImagery",
    "StandWalkJump",
    "EthanolConcentration",
    "Cricket",
    "SelfRegulationSCP2",
];

pub const LARGE_DATASETS: &[&str] = &[
    "InsectWingbeat",
    "ElectricDevices",
    "PenDigits",
    "SpokenArabicDigits",
    "FaceDetection",
    "PhonemeSpectra",
    "LSST",
    "UWaveGestureLibrary",
    "CharacterTrajectories",
];

/// Ordered by channels * dataset size * num_classes * length^2,
/// i.e. the cost of evaluating shapelets on them. PenDigits is left
/// out: its series are too short for meaningful shapelets.
pub const DATASETS_BY_COST: &[&str] = &[
    "ERing",
    "RacketSports",
    "BasicMotions",
    "Libras",
    "JapaneseVowels",
    "AtrialFibrillation",
    "FingerMovements",
    "NATOPS",
    "Epilepsy",
    "LSST",
    "Handwriting",
    "UWaveGestureLibrary",
    "StandWalkJump",
    "HandMovementDirection",
    "ArticularyWordRecognition",
    "SelfRegulationSCP1",
    "CharacterTrajectories",
    "SelfRegulationSCP2",
    "Heartbeat",
    "FaceDetection",
    "SpokenArabicDigits",
    "EthanolConcentration",
    "Cricket",
    "DuckDuckGeese",
    "PEMS-SF",
    "InsectWingbeat",
    "PhonemeSpectra",
    "MotorImagery",
    "EigenWorms",
];

/// Datasets used by the missingness, noise and length suites.
pub const STANDARD_DATASET_NAMES: &[&str] = &["JapaneseVowels", "BasicMotions", "FingerMovements"];

pub fn is_valid_dataset(name: &str) -> bool {
    VALID_DATASET_NAMES.contains(&name)
}

pub fn is_long_dataset(name: &str) -> bool {
    LONG_DATASETS.contains(&name)
}

pub fn is_large_dataset(name: &str) -> bool {
    LARGE_DATASETS.contains(&name)
}
