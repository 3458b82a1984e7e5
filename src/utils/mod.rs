// Shared plumbing between the acquisition side (component A) and the server side (component B).

pub mod shared_state;
pub mod shutdown;
