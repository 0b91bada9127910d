// Drill generation: grid layout, operand sampling, answer pagination and the
// worksheet builder that ties them together.
// Generation is synchronous; handlers run it inside tokio::task::spawn_blocking.

pub mod answers;
pub mod difficulty;
pub mod handlers;
pub mod layout;
pub mod question;
pub mod worksheet;
