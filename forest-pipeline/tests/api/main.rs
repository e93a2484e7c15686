mod aggregation;
mod helpers;
mod prediction;
mod training;
