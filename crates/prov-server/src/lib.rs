//! HTTP surface for product-record commitment and verification.
//!
//! A thin axum layer over [`ProvenanceService`](prov_engine::ProvenanceService):
//! it parses request bodies, maps engine errors to status codes, and holds no
//! commitment logic of its own.
//!
//! | route | success | failures |
//! |---|---|---|
//! | `POST /v1/records` | 201 | 409 duplicate, 422 invalid, 502 collaborator, 500 fatal |
//! | `POST /v1/verify` | 200 (authentic or tampered) | 404 unknown, 502 collaborator, 500 fatal |
//! | `GET /v1/health` | 200 | |

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use api::{endpoints, CommitResponse, ErrorBody, HealthResponse, VerifyResponse};
pub use config::ServiceConfig;
pub use error::{ServerError, ServerResult};
pub use server::ProvServer;
