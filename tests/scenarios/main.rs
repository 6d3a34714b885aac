//! End-to-end scenarios running the full pipeline against mock collaborators

mod helpers;

mod pin_enforcement;
mod repo_list;
mod verification;
