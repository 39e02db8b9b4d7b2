pub mod doctor;
pub mod expand;
pub mod search;
