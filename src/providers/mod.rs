mod github;

pub use github::{EventInputs, GitHubEventSource};
