pub mod control;
pub mod dispatcher;
pub mod osc;
pub mod pipeline;
pub mod sources;
pub mod strategies;
