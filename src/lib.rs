//! Volume d’un solide de révolution par la méthode des disques.
//!
//! - `noyau` : compilation d’expressions en x (liste blanche), grille fixe
//!   des milieux et Simpson adaptatif. Aucune dépendance UI.
//! - `app` : session (catalogue, domaine, tranches, tolérance) + vue egui.

pub mod app;
pub mod noyau;
