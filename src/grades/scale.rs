use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradeError {
    #[error("Unknown grade label: {0}")]
    UnknownLabel(String),
    #[error("Cannot compare {0} grade with {1} grade")]
    MixedDisciplines(ClimbingType, ClimbingType),
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClimbingType {
    #[default]
    Bouldering,
    Sport,
}

impl fmt::Display for ClimbingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &'static str = self.into();
        write!(f, "{}", label)
    }
}

/// Hueco bouldering scale. Discriminants are the canonical order index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
    IntoStaticStr,
)]
pub enum BoulderingGrade {
    V1 = 0,
    V2 = 1,
    V3 = 2,
    V4 = 3,
    V5 = 4,
    V6 = 5,
    V7 = 6,
    V8 = 7,
    V9 = 8,
    V10 = 9,
}

impl BoulderingGrade {
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

impl PartialOrd for BoulderingGrade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoulderingGrade {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

impl fmt::Display for BoulderingGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Yosemite decimal scale for sport routes, 5.9 through 5.15d.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
    IntoStaticStr,
)]
pub enum SportGrade {
    #[serde(rename = "5.9")]
    #[strum(serialize = "5.9")]
    Yds9 = 0,
    #[serde(rename = "5.10a")]
    #[strum(serialize = "5.10a")]
    Yds10a = 1,
    #[serde(rename = "5.10b")]
    #[strum(serialize = "5.10b")]
    Yds10b = 2,
    #[serde(rename = "5.10c")]
    #[strum(serialize = "5.10c")]
    Yds10c = 3,
    #[serde(rename = "5.10d")]
    #[strum(serialize = "5.10d")]
    Yds10d = 4,
    #[serde(rename = "5.11a")]
    #[strum(serialize = "5.11a")]
    Yds11a = 5,
    #[serde(rename = "5.11b")]
    #[strum(serialize = "5.11b")]
    Yds11b = 6,
    #[serde(rename = "5.11c")]
    #[strum(serialize = "5.11c")]
    Yds11c = 7,
    #[serde(rename = "5.11d")]
    #[strum(serialize = "5.11d")]
    Yds11d = 8,
    #[serde(rename = "5.12a")]
    #[strum(serialize = "5.12a")]
    Yds12a = 9,
    #[serde(rename = "5.12b")]
    #[strum(serialize = "5.12b")]
    Yds12b = 10,
    #[serde(rename = "5.12c")]
    #[strum(serialize = "5.12c")]
    Yds12c = 11,
    #[serde(rename = "5.12d")]
    #[strum(serialize = "5.12d")]
    Yds12d = 12,
    #[serde(rename = "5.13a")]
    #[strum(serialize = "5.13a")]
    Yds13a = 13,
    #[serde(rename = "5.13b")]
    #[strum(serialize = "5.13b")]
    Yds13b = 14,
    #[serde(rename = "5.13c")]
    #[strum(serialize = "5.13c")]
    Yds13c = 15,
    #[serde(rename = "5.13d")]
    #[strum(serialize = "5.13d")]
    Yds13d = 16,
    #[serde(rename = "5.14a")]
    #[strum(serialize = "5.14a")]
    Yds14a = 17,
    #[serde(rename = "5.14b")]
    #[strum(serialize = "5.14b")]
    Yds14b = 18,
    #[serde(rename = "5.14c")]
    #[strum(serialize = "5.14c")]
    Yds14c = 19,
    #[serde(rename = "5.14d")]
    #[strum(serialize = "5.14d")]
    Yds14d = 20,
    #[serde(rename = "5.15a")]
    #[strum(serialize = "5.15a")]
    Yds15a = 21,
    #[serde(rename = "5.15b")]
    #[strum(serialize = "5.15b")]
    Yds15b = 22,
    #[serde(rename = "5.15c")]
    #[strum(serialize = "5.15c")]
    Yds15c = 23,
    #[serde(rename = "5.15d")]
    #[strum(serialize = "5.15d")]
    Yds15d = 24,
}

impl SportGrade {
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

impl PartialOrd for SportGrade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SportGrade {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

impl fmt::Display for SportGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A graded difficulty in one of the two disciplines.
///
/// Has no `Ord` impl. Grades from different disciplines are only comparable
/// through [`combined_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "grade", rename_all = "lowercase")]
pub enum Difficulty {
    Bouldering(BoulderingGrade),
    Sport(SportGrade),
}

impl Difficulty {
    pub fn climbing_type(&self) -> ClimbingType {
        match self {
            Difficulty::Bouldering(_) => ClimbingType::Bouldering,
            Difficulty::Sport(_) => ClimbingType::Sport,
        }
    }

    /// Position within this difficulty's own discipline scale.
    pub fn index(&self) -> usize {
        match self {
            Difficulty::Bouldering(grade) => grade.index(),
            Difficulty::Sport(grade) => grade.index(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Bouldering(grade) => grade.label(),
            Difficulty::Sport(grade) => grade.label(),
        }
    }

    pub fn is_type(&self, climbing_type: ClimbingType) -> bool {
        self.climbing_type() == climbing_type
    }

    /// Every grade of one discipline, easiest first.
    pub fn scale(climbing_type: ClimbingType) -> Vec<Difficulty> {
        match climbing_type {
            ClimbingType::Bouldering => BoulderingGrade::iter()
                .map(Difficulty::Bouldering)
                .collect(),
            ClimbingType::Sport => SportGrade::iter().map(Difficulty::Sport).collect(),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Difficulty {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(grade) = BoulderingGrade::from_str(trimmed) {
            return Ok(Difficulty::Bouldering(grade));
        }
        if let Ok(grade) = SportGrade::from_str(trimmed) {
            return Ok(Difficulty::Sport(grade));
        }
        Err(GradeError::UnknownLabel(s.to_string()))
    }
}

impl From<BoulderingGrade> for Difficulty {
    fn from(grade: BoulderingGrade) -> Self {
        Difficulty::Bouldering(grade)
    }
}

impl From<SportGrade> for Difficulty {
    fn from(grade: SportGrade) -> Self {
        Difficulty::Sport(grade)
    }
}

/// Compares two grades of the same discipline by canonical index.
pub fn compare_within(a: &Difficulty, b: &Difficulty) -> Result<Ordering, GradeError> {
    match (a, b) {
        (Difficulty::Bouldering(x), Difficulty::Bouldering(y)) => Ok(x.cmp(y)),
        (Difficulty::Sport(x), Difficulty::Sport(y)) => Ok(x.cmp(y)),
        _ => Err(GradeError::MixedDisciplines(
            a.climbing_type(),
            b.climbing_type(),
        )),
    }
}

/// All bouldering grades ascending followed by all sport grades ascending.
///
/// Every sport grade ranks above every bouldering grade in this list. It is not
/// a difficulty equivalence, only the ordering used for the overall personal best.
pub fn combined_order() -> Vec<Difficulty> {
    let mut order = Difficulty::scale(ClimbingType::Bouldering);
    order.extend(Difficulty::scale(ClimbingType::Sport));
    order
}

/// Position of `difficulty` in `within`, or 0 when it is not listed.
pub fn index_of(difficulty: &Difficulty, within: &[Difficulty]) -> usize {
    within
        .iter()
        .position(|candidate| candidate == difficulty)
        .unwrap_or(0)
}
