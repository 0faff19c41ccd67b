// src/noyau/riemann.rs
//
// Volume par disques, grille fixe (somme de Riemann au milieu).
// - n tranches de largeur dx = (b - a) / n
// - rayon de la tranche i = |f(a + (i + 1/2)·dx)|
// - volume = Σ π·rayon²·dx
//
// Contrat : au premier échec d’évaluation, tout est abandonné
// (ni volume partiel, ni tranches partielles).

use std::f64::consts::PI;
use std::num::NonZeroUsize;

use tracing::{debug, warn};

use super::compilateur::FunctionHandle;
use super::domaine::Domain;
use super::erreur::EvaluationFailed;

/// Échantillon d’une tranche (pour dessiner le disque).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tranche {
    pub milieu: f64,
    pub rayon: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrilleFixe {
    volume: f64,
    tranches: Vec<Tranche>,
}

impl GrilleFixe {
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Exactement n tranches, x croissants.
    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }
}

pub fn fixed_grid_volume(
    f: &FunctionHandle,
    domaine: Domain,
    n: NonZeroUsize,
) -> Result<GrilleFixe, EvaluationFailed> {
    let n = n.get();
    let a = domaine.start();
    let dx = domaine.largeur() / n as f64;

    let mut tranches = Vec::with_capacity(n);
    let mut volume = 0.0;

    for i in 0..n {
        let milieu = a + (i as f64 + 0.5) * dx;
        let rayon = match f.eval(milieu) {
            Ok(v) => v.abs(),
            Err(e) => {
                warn!(x = milieu, cause = %e.cause, "grille fixe abandonnée");
                return Err(e);
            }
        };
        volume += PI * rayon * rayon * dx;
        tranches.push(Tranche { milieu, rayon });
    }

    if !volume.is_finite() {
        return Err(EvaluationFailed {
            x: tranches.last().map_or(a, |t| t.milieu),
            cause: "volume non fini".into(),
        });
    }

    debug!(n, volume, "grille fixe");
    Ok(GrilleFixe { volume, tranches })
}
