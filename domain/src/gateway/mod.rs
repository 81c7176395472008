//! Clients for the REVEL8 backend's request/response endpoints.

pub mod agent_api;
