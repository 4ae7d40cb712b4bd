// Skill matching: pure, deterministic, no I/O.
// Callers pass the profile in explicitly; nothing here reads storage.

pub mod handlers;
pub mod skill_match;
