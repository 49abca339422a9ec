pub mod light_event_queries;
