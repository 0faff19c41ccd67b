//! src/app/etat.rs
//!
//! État de session (sans vue).
//!
//! Rôle : catalogue de fonctions, domaine, nombre de tranches, tolérance,
//! résultats courants (grille fixe + cache adaptatif) et message d’état.
//!
//! Contrats :
//! - Tout calcul passe par le noyau (compile, fixed_grid_volume, adaptive_volume).
//! - Tout changement structurel (fonction, domaine, tranches, tolérance)
//!   recalcule la grille fixe et vide le cache adaptatif.
//! - Grille en échec => volume indisponible (None), jamais l’ancienne valeur.

use std::f64::consts::PI;
use std::num::NonZeroUsize;

use tracing::{info, warn};

use crate::noyau::{
    adaptive_volume, compile, fixed_grid_volume, Domain, ErreurNoyau, EvaluationFailed,
    FunctionHandle, GrilleFixe, IntegrationResult, Tranche, PROFONDEUR_DEFAUT,
};

/// Nombre de tranches par défaut (et après réinitialisation).
pub const TRANCHES_DEFAUT: usize = 12;
pub const TRANCHES_MIN: usize = 4;
pub const TRANCHES_MAX: usize = 240;

/// Bornes du domaine quand on le décale pas à pas.
pub const BORNE_MIN: f64 = -10.0;
pub const BORNE_MAX: f64 = 10.0;
pub const ECART_MIN: f64 = 0.2;

/// Tolérances proposées (cycle).
pub const TOLERANCES: [f64; 6] = [0.05, 0.02, 0.01, 0.005, 0.001, 0.0005];
pub const TOLERANCE_DEFAUT: f64 = 0.005;

pub const RESOLUTION_COURBE: usize = 180;

/// Échantillonnage de contrôle d’une fonction personnalisée.
pub const ECHANTILLONS_VALIDATION: usize = 90;

/// Une entrée du catalogue.
#[derive(Clone, Debug)]
pub struct FonctionCatalogue {
    pub nom: String,
    pub fonction: FunctionHandle,
    pub domaine_suggere: Domain,
}

/// Champs texte du formulaire “fonction personnalisée”.
#[derive(Clone, Debug, Default)]
pub struct Saisie {
    pub texte: String,
    pub debut: String,
    pub fin: String,
}

#[derive(Debug)]
pub struct Session {
    fonctions: Vec<FonctionCatalogue>,
    courante: usize,
    domaine: Domain,
    tranches: usize,
    tolerance: f64,

    grille: Option<GrilleFixe>,
    adaptatif: Option<IntegrationResult>,

    perso: usize,
    message: String,

    // --- UX ---
    pub saisie: Saisie,
}

fn preset(
    nom: &str,
    texte: &str,
    debut: f64,
    fin: f64,
) -> Result<FonctionCatalogue, ErreurNoyau> {
    Ok(FonctionCatalogue {
        nom: nom.to_string(),
        fonction: compile(texte)?,
        domaine_suggere: Domain::new(debut, fin)?,
    })
}

/// Contrôle sur ECHANTILLONS_VALIDATION pas (extrémités incluses) ; renvoie le minimum.
fn minimum_echantillonne(f: &FunctionHandle, d: Domain) -> Result<f64, EvaluationFailed> {
    let n = ECHANTILLONS_VALIDATION;
    let pas = d.largeur() / n as f64;
    let mut min = f64::INFINITY;
    for i in 0..=n {
        let x = if i == n { d.end() } else { d.start() + i as f64 * pas };
        min = min.min(f.eval(x)?);
    }
    Ok(min)
}

impl Session {
    pub fn new() -> Result<Self, ErreurNoyau> {
        let fonctions = vec![
            preset("Bol quadratique", "(x - 1)^2 + 0.5", 0.0, 2.0)?,
            preset("Sinus décalé", "sin(x) + 1.25", 0.0, PI)?,
            preset("Arc exponentiel", "0.6*e^(0.5*x)", 0.0, 2.0)?,
        ];
        let domaine = fonctions[0].domaine_suggere;

        let mut s = Self {
            fonctions,
            courante: 0,
            domaine,
            tranches: TRANCHES_DEFAUT,
            tolerance: TOLERANCE_DEFAUT,
            grille: None,
            adaptatif: None,
            perso: 0,
            message: "←/→ pour changer de fonction, ou saisir la vôtre.".to_string(),
            saisie: Saisie::default(),
        };
        s.recalculer();
        Ok(s)
    }

    /* ------------------------ Lecture ------------------------ */

    pub fn fonctions(&self) -> &[FonctionCatalogue] {
        &self.fonctions
    }

    pub fn courante(&self) -> &FonctionCatalogue {
        &self.fonctions[self.courante]
    }

    pub fn indice_courant(&self) -> usize {
        self.courante
    }

    pub fn domaine(&self) -> Domain {
        self.domaine
    }

    pub fn tranches(&self) -> usize {
        self.tranches
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// None : la dernière grille fixe a échoué.
    pub fn volume(&self) -> Option<f64> {
        self.grille.as_ref().map(GrilleFixe::volume)
    }

    /// Vide si la grille est indisponible.
    pub fn echantillons(&self) -> &[Tranche] {
        self.grille.as_ref().map(GrilleFixe::tranches).unwrap_or(&[])
    }

    pub fn adaptatif(&self) -> Option<&IntegrationResult> {
        self.adaptatif.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Points (x, f(x)) réguliers, extrémités incluses. Échec au premier point invalide.
    pub fn points_courbe(&self, resolution: usize) -> Result<Vec<(f64, f64)>, EvaluationFailed> {
        let n = resolution.max(1);
        let f = &self.courante().fonction;
        let (a, b) = (self.domaine.start(), self.domaine.end());
        let pas = self.domaine.largeur() / n as f64;

        (0..=n)
            .map(|i| {
                let x = if i == n { b } else { a + i as f64 * pas };
                f.eval(x).map(|y| (x, y))
            })
            .collect()
    }

    /// max |f| sur la courbe échantillonnée ; 0 si la courbe est indisponible.
    pub fn rayon_max(&self) -> f64 {
        self.points_courbe(RESOLUTION_COURBE)
            .map(|pts| pts.iter().fold(0.0, |m: f64, &(_, y)| m.max(y.abs())))
            .unwrap_or(0.0)
    }

    /* ------------------------ Actions ------------------------ */

    pub fn fonction_suivante(&mut self) {
        self.changer_fonction(1);
    }

    pub fn fonction_precedente(&mut self) {
        self.changer_fonction(-1);
    }

    fn changer_fonction(&mut self, pas: isize) {
        let n = self.fonctions.len() as isize;
        self.courante = (self.courante as isize + pas).rem_euclid(n) as usize;
        self.domaine = self.courante().domaine_suggere;
        self.message = format!("Fonction : {}", self.courante().nom);
        self.recalculer();
    }

    /// Décale les bornes ; écart minimal ECART_MIN, bornes dans [BORNE_MIN, BORNE_MAX].
    pub fn ajuster_domaine(&mut self, delta_debut: f64, delta_fin: f64) {
        if !(delta_debut.is_finite() && delta_fin.is_finite()) {
            self.message = "Décalage de domaine invalide.".to_string();
            return;
        }
        let debut = (self.domaine.start() + delta_debut).clamp(BORNE_MIN, BORNE_MAX - ECART_MIN);
        let fin = (self.domaine.end() + delta_fin)
            .max(debut + ECART_MIN)
            .min(BORNE_MAX);
        match Domain::new(debut, fin) {
            Ok(d) => self.appliquer_domaine(d),
            Err(e) => self.message = e.to_string(),
        }
    }

    pub fn definir_domaine(&mut self, debut: f64, fin: f64) -> Result<(), ErreurNoyau> {
        match Domain::new(debut, fin) {
            Ok(d) => {
                self.appliquer_domaine(d);
                Ok(())
            }
            Err(e) => {
                self.message = e.to_string();
                Err(e.into())
            }
        }
    }

    fn appliquer_domaine(&mut self, d: Domain) {
        self.domaine = d;
        self.message = format!("Domaine : [{:.2}, {:.2}]", d.start(), d.end());
        self.recalculer();
    }

    pub fn ajuster_tranches(&mut self, delta: isize) {
        let n = self.tranches.saturating_add_signed(delta);
        self.tranches = n.clamp(TRANCHES_MIN, TRANCHES_MAX);
        self.message = format!("{} tranches pour l’approximation.", self.tranches);
        self.recalculer();
    }

    /// Tolérance suivante du cycle (une valeur hors cycle repart du début).
    pub fn cycler_tolerance(&mut self) {
        let i = TOLERANCES
            .iter()
            .position(|&t| t == self.tolerance)
            .map_or(0, |i| (i + 1) % TOLERANCES.len());
        self.tolerance = TOLERANCES[i];
        self.message = format!("Tolérance adaptative : ±{}", self.tolerance);
        self.recalculer();
    }

    /// Domaine suggéré + tranches par défaut pour la fonction courante.
    pub fn reinitialiser(&mut self) {
        self.domaine = self.courante().domaine_suggere;
        self.tranches = TRANCHES_DEFAUT;
        self.message = format!("Valeurs par défaut pour {}.", self.courante().nom);
        self.recalculer();
    }

    /// Simpson adaptatif, contrôlé contre la grille fixe courante (si disponible).
    pub fn raffiner(&mut self) {
        let f = &self.fonctions[self.courante].fonction;
        match adaptive_volume(f, self.domaine, self.tolerance, PROFONDEUR_DEFAUT) {
            Ok(r) => {
                let r = match self.volume() {
                    Some(v) => r.avec_controle(v),
                    None => r,
                };
                self.message = match r.error_estimate() {
                    Some(ecart) => format!(
                        "Volume adaptatif ≈ {:.5} ; écart grille ≈ {:.5e} ; tranches conseillées : {}.",
                        r.volume(),
                        ecart,
                        r.recommended_slices()
                    ),
                    None => format!(
                        "Volume adaptatif ≈ {:.5} ; tranches conseillées : {}.",
                        r.volume(),
                        r.recommended_slices()
                    ),
                };
                self.adaptatif = Some(r);
            }
            Err(e) => {
                self.message = format!("Raffinement adaptatif impossible : {e}");
                self.adaptatif = None;
            }
        }
    }

    pub fn appliquer_recommandation(&mut self) {
        let Some(n) = self.adaptatif.as_ref().map(IntegrationResult::recommended_slices) else {
            self.message = "Aucune recommandation : lancer d’abord le raffinement.".to_string();
            return;
        };
        self.tranches = n.clamp(TRANCHES_MIN, TRANCHES_MAX);
        self.message = format!("Nombre de tranches conseillé appliqué : {}", self.tranches);
        self.recalculer();
    }

    /// Compile, contrôle sur le domaine, puis ajoute et sélectionne “Perso N”.
    /// En cas d’échec, le catalogue et la sélection sont inchangés.
    pub fn ajouter_fonction(
        &mut self,
        texte: &str,
        debut: f64,
        fin: f64,
    ) -> Result<(), ErreurNoyau> {
        let resultat = compile(texte)
            .map_err(ErreurNoyau::from)
            .and_then(|f| Ok((f, Domain::new(debut, fin)?)))
            .and_then(|(f, d)| Ok((minimum_echantillonne(&f, d)?, f, d)));

        let (min, fonction, domaine) = match resultat {
            Ok(v) => v,
            Err(e) => {
                warn!(texte, erreur = %e, "fonction refusée");
                self.message = format!("Fonction refusée : {e}");
                return Err(e);
            }
        };

        self.perso += 1;
        let nom = format!("Perso {}", self.perso);
        info!(nom = %nom, forme = %fonction.forme(), "fonction ajoutée");

        self.fonctions.push(FonctionCatalogue {
            nom: nom.clone(),
            fonction,
            domaine_suggere: domaine,
        });
        self.courante = self.fonctions.len() - 1;
        self.domaine = domaine;

        self.message = if min < 0.0 {
            format!("{nom} ajoutée. Attention : la fonction passe sous l’axe, les disques utilisent |f(x)|.")
        } else {
            format!("{nom} ajoutée.")
        };
        self.recalculer();
        Ok(())
    }

    /// Variante formulaire : lit `saisie` (bornes en texte), vide le texte si succès.
    pub fn soumettre_saisie(&mut self) {
        let lire = |s: &str, quoi: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| format!("{quoi} du domaine : nombre attendu"))
        };
        let bornes = lire(&self.saisie.debut, "début")
            .and_then(|a| Ok((a, lire(&self.saisie.fin, "fin")?)));

        match bornes {
            Ok((a, b)) => {
                let texte = self.saisie.texte.clone();
                if self.ajouter_fonction(&texte, a, b).is_ok() {
                    self.saisie.texte.clear();
                }
            }
            Err(m) => self.message = m,
        }
    }

    /* ------------------------ Recalcul ------------------------ */

    fn recalculer(&mut self) {
        self.adaptatif = None;

        let n = NonZeroUsize::new(self.tranches).unwrap_or(NonZeroUsize::MIN);
        let f = &self.fonctions[self.courante].fonction;
        match fixed_grid_volume(f, self.domaine, n) {
            Ok(g) => self.grille = Some(g),
            Err(e) => {
                self.grille = None;
                self.message = format!("Volume indisponible : {e}");
            }
        }
    }
}
