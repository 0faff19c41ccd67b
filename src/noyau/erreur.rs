// src/noyau/erreur.rs
//
// Erreurs du noyau.
// - SyntaxRejected   : le texte sort de la grammaire (compilation seulement)
// - EvaluationFailed : un appel de la fonction compilée n’a pas de valeur réelle finie
// - DomaineInvalide  : bornes d’intégration incohérentes
//
// Toutes récupérables : le noyau ne panique jamais sur une entrée utilisateur.

use thiserror::Error;

/// Texte hors grammaire. Jamais de compilation partielle.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("expression rejetée : {raison}")]
pub struct SyntaxRejected {
    pub raison: String,
}

impl SyntaxRejected {
    pub fn new(raison: impl Into<String>) -> Self {
        Self {
            raison: raison.into(),
        }
    }
}

/// Échec d’un appel : domaine, division par zéro, complexe, non fini…
#[derive(Clone, Debug, PartialEq, Error)]
#[error("évaluation impossible en x = {x} : {cause}")]
pub struct EvaluationFailed {
    pub x: f64,
    pub cause: String,
}

#[derive(Clone, Debug, PartialEq, Error)]
#[error("domaine invalide [{debut}, {fin}] : il faut début < fin, bornes finies")]
pub struct DomaineInvalide {
    pub debut: f64,
    pub fin: f64,
}

/// Enveloppe utilisée par la couche session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErreurNoyau {
    #[error(transparent)]
    Syntaxe(#[from] SyntaxRejected),

    #[error(transparent)]
    Evaluation(#[from] EvaluationFailed),

    #[error(transparent)]
    Domaine(#[from] DomaineInvalide),
}
