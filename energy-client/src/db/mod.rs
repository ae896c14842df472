pub mod energy_queries;
