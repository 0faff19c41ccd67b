// src/noyau/domaine.rs

use super::erreur::DomaineInvalide;

/// Intervalle d’intégration [début, fin], toujours début < fin, bornes finies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    start: f64,
    end: f64,
}

impl Domain {
    pub fn new(start: f64, end: f64) -> Result<Self, DomaineInvalide> {
        if start.is_finite() && end.is_finite() && start < end {
            Ok(Self { start, end })
        } else {
            Err(DomaineInvalide {
                debut: start,
                fin: end,
            })
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn largeur(&self) -> f64 {
        self.end - self.start
    }

    pub fn milieu(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}
