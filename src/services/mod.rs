/// Cue audio synthesis and caching.
pub mod audio;
/// Announcement text and cue URLs.
pub mod cues;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Masthead view composition.
pub mod masthead;
/// Playback use-cases.
pub mod play_service;
/// Storage reconnection loop toggling degraded mode.
pub mod storage_supervisor;
/// Timer and level management use-cases.
pub mod timer_service;

/// Fixtures shared by unit and HTTP tests.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
