//! AI-generated image detector.
//!
//! Uploads are classified as AI-made or human-made by a pre-trained model,
//! shown with an animation, and saved for the history page.

pub mod assets;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod preprocess;
pub mod routes;
pub mod services;
pub mod startup;
pub mod store;
pub mod views;

use std::path::PathBuf;
use std::sync::Arc;

use assets::Animations;
use classifier::Classifier;
use store::ResultStore;
use views::Views;

/// Process-wide resources shared by every request
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub store: ResultStore,
    pub views: Views,
    pub animations: Animations,
    pub assets_dir: PathBuf,
}
