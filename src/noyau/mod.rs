//! Noyau numérique (méthode des disques)
//!
//! Organisation interne :
//! - jetons.rs      : tokenisation (littéraux exacts)
//! - rpn.rs         : shunting-yard + arbre brut
//! - syntaxe.rs     : arbre brut + validation (liste blanche)
//! - primitives.rs  : environnement fermé (fonctions, constantes)
//! - expr.rs        : Expr validée + repli exact + affichage
//! - compilateur.rs : pipeline complet -> FunctionHandle
//! - domaine.rs     : intervalle d’intégration
//! - riemann.rs     : volume, grille fixe (milieux)
//! - simpson.rs     : volume, Simpson adaptatif
//! - erreur.rs      : erreurs typées

pub mod compilateur;
pub mod domaine;
pub mod erreur;
pub mod expr;
pub mod jetons;
pub mod primitives;
pub mod riemann;
pub mod rpn;
pub mod simpson;
pub mod syntaxe;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use compilateur::{compile, FunctionHandle};
pub use domaine::Domain;
pub use erreur::{DomaineInvalide, ErreurNoyau, EvaluationFailed, SyntaxRejected};
pub use riemann::{fixed_grid_volume, GrilleFixe, Tranche};
pub use simpson::{
    adaptive_volume, IntegrationResult, RefinementInterval, PROFONDEUR_DEFAUT, PROFONDEUR_LIMITE,
};
