pub mod bracket;
pub mod cap_math;
pub mod schedule;
pub mod seeder;
pub mod simulator;
pub mod windows;

pub use seeder::{PlayoffSeeder, SeederInputs};
pub use simulator::{GameSimulator, InstantSimulator};
pub use windows::TransactionWindows;
