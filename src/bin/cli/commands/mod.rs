pub mod cards;
pub mod courses;
pub mod review;
pub mod stats;
pub mod subjects;
