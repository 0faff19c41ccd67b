// src/noyau/simpson.rs
//
// Volume par disques, Simpson adaptatif.
// Intégrande : aire du disque A(x) = π·|f(x)|².
//
// Pour [a, b] avec A(a), A(m), A(b) connus : S = (b - a)/6 · (fa + 4·fm + fb).
// On coupe en c = (a + b)/2, on évalue les deux nouveaux milieux (fd, fe),
// S2 = S_gauche + S_droite.
// - profondeur == D ou |S2 - S| ≤ 15·tol : intervalle terminal,
//   contribution = S2 + (S2 - S)/15 (Richardson)
// - sinon : deux appels récursifs, tol/2 chacun, profondeur + 1
//
// Les valeurs déjà connues descendent en paramètres : le milieu du parent
// devient l’extrémité des enfants, aucune réévaluation.

use std::f64::consts::PI;

use tracing::{debug, warn};

use super::compilateur::FunctionHandle;
use super::domaine::Domain;
use super::erreur::EvaluationFailed;

pub const PROFONDEUR_DEFAUT: u32 = 12;

/// Au-delà, le nombre d’évaluations (O(2^D)) n’est plus interactif.
pub const PROFONDEUR_LIMITE: u32 = 16;

/// Intervalle terminal (non subdivisé), avec sa profondeur d’acceptation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefinementInterval {
    pub start: f64,
    pub end: f64,
    pub depth: u32,
}

/// Résultat d’une passe adaptative. Immuable : un nouveau calcul remplace l’ancien.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationResult {
    volume: f64,
    intervals: Vec<RefinementInterval>,
    error_estimate: Option<f64>,
    evaluations: usize,
}

impl IntegrationResult {
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Intervalles terminaux, de gauche à droite ; ils pavent exactement le domaine.
    pub fn intervals(&self) -> &[RefinementInterval] {
        &self.intervals
    }

    /// |adaptatif - grille fixe| si un contrôle a été fourni.
    pub fn error_estimate(&self) -> Option<f64> {
        self.error_estimate
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Heuristique d’affichage : max(12, 2 × nombre d’intervalles terminaux).
    pub fn recommended_slices(&self) -> usize {
        (2 * self.intervals.len()).max(12)
    }

    pub fn profondeur_max_atteinte(&self) -> u32 {
        self.intervals.iter().map(|i| i.depth).max().unwrap_or(0)
    }

    /// Nouveau résultat dont l’estimation d’erreur est l’écart avec la grille fixe.
    pub fn avec_controle(self, volume_fixe: f64) -> Self {
        let ecart = (self.volume - volume_fixe).abs();
        Self {
            error_estimate: Some(ecart),
            ..self
        }
    }
}

/// Un intervalle avec ses trois valeurs connues et son Simpson de base.
#[derive(Clone, Copy, Debug)]
struct Segment {
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    s: f64,
}

fn simpson_basique(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

struct Raffinement<'a> {
    f: &'a FunctionHandle,
    profondeur_max: u32,
    intervalles: Vec<RefinementInterval>,
    evaluations: usize,
}

impl Raffinement<'_> {
    /// A(x) = π·|f(x)|², refusée si non finie.
    fn aire(&mut self, x: f64) -> Result<f64, EvaluationFailed> {
        self.evaluations += 1;
        let r = self.f.eval(x)?.abs();
        let aire = PI * r * r;
        if aire.is_finite() {
            Ok(aire)
        } else {
            Err(EvaluationFailed {
                x,
                cause: "aire non finie".into(),
            })
        }
    }

    fn integrer(&mut self, domaine: Domain, tol: f64) -> Result<f64, EvaluationFailed> {
        let (a, b) = (domaine.start(), domaine.end());
        let fa = self.aire(a)?;
        let fb = self.aire(b)?;
        let fm = self.aire(domaine.milieu())?;
        let s = simpson_basique(a, b, fa, fm, fb);
        self.raffiner(Segment { a, b, fa, fm, fb, s }, tol, 0)
    }

    fn raffiner(
        &mut self,
        seg: Segment,
        tol: f64,
        profondeur: u32,
    ) -> Result<f64, EvaluationFailed> {
        let Segment { a, b, fa, fm, fb, s } = seg;

        let c = (a + b) / 2.0;
        let fd = self.aire((a + c) / 2.0)?;
        let fe = self.aire((c + b) / 2.0)?;

        let s_gauche = simpson_basique(a, c, fa, fd, fm);
        let s_droite = simpson_basique(c, b, fm, fe, fb);
        let s2 = s_gauche + s_droite;

        if profondeur >= self.profondeur_max || (s2 - s).abs() <= 15.0 * tol {
            self.intervalles.push(RefinementInterval {
                start: a,
                end: b,
                depth: profondeur,
            });
            return Ok(s2 + (s2 - s) / 15.0);
        }

        let gauche = Segment {
            a,
            b: c,
            fa,
            fm: fd,
            fb: fm,
            s: s_gauche,
        };
        let droite = Segment {
            a: c,
            b,
            fa: fm,
            fm: fe,
            fb,
            s: s_droite,
        };

        let vg = self.raffiner(gauche, tol / 2.0, profondeur + 1)?;
        let vd = self.raffiner(droite, tol / 2.0, profondeur + 1)?;
        Ok(vg + vd)
    }
}

/// Volume par Simpson adaptatif.
///
/// `tol` non finie ou ≤ 0 : traitée comme 0 (raffinement jusqu’à la profondeur max).
/// `max_depth` est borné à `PROFONDEUR_LIMITE`.
pub fn adaptive_volume(
    f: &FunctionHandle,
    domaine: Domain,
    tol: f64,
    max_depth: u32,
) -> Result<IntegrationResult, EvaluationFailed> {
    let tol = if tol.is_finite() && tol > 0.0 {
        tol
    } else {
        warn!(tol, "tolérance invalide, raffinement jusqu’à la profondeur max");
        0.0
    };
    let profondeur_max = if max_depth > PROFONDEUR_LIMITE {
        warn!(max_depth, limite = PROFONDEUR_LIMITE, "profondeur bornée");
        PROFONDEUR_LIMITE
    } else {
        max_depth
    };

    let mut r = Raffinement {
        f,
        profondeur_max,
        intervalles: Vec::new(),
        evaluations: 0,
    };

    let volume = match r.integrer(domaine, tol) {
        Ok(v) => v,
        Err(e) => {
            warn!(x = e.x, cause = %e.cause, "raffinement adaptatif abandonné");
            return Err(e);
        }
    };

    debug!(
        volume,
        intervalles = r.intervalles.len(),
        evaluations = r.evaluations,
        "simpson adaptatif"
    );

    Ok(IntegrationResult {
        volume,
        intervals: r.intervalles,
        error_estimate: None,
        evaluations: r.evaluations,
    })
}
