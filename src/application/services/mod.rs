//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (MemberRepository, Selector)
//! but are themselves concrete structs, not traits.

pub mod chart;
pub mod mentor;

pub use chart::ChartSession;
pub use mentor::MentorService;
