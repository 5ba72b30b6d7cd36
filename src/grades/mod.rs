pub mod scale;


pub use scale::{
    combined_order, compare_within, index_of, BoulderingGrade, ClimbingType, Difficulty,
    GradeError, SportGrade,
};
