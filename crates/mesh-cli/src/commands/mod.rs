pub mod cut;
pub mod info;
pub mod sections;
