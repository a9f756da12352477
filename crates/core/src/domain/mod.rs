pub mod race;
pub mod tire;
