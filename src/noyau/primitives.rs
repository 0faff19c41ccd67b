// src/noyau/primitives.rs
//
// Environnement fermé : la SEULE table de noms qu’une expression peut atteindre.
// - constantes : pi, e
// - fonctions  : liste blanche unaire (définitions réelles, domaines vérifiés)
//
// Aucune résolution “ambiante” : la validation passe par ENVIRONNEMENT,
// l’évaluation n’appelle que Primitive::appliquer.

use std::f64::consts;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constante {
    Pi,
    E,
}

impl Constante {
    pub fn nom(self) -> &'static str {
        match self {
            Constante::Pi => "pi",
            Constante::E => "e",
        }
    }

    pub fn valeur(self) -> f64 {
        match self {
            Constante::Pi => consts::PI,
            Constante::E => consts::E,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Log10,
    Sqrt,
    Sinh,
    Cosh,
    Tanh,
    Abs,
}

impl Primitive {
    pub fn nom(self) -> &'static str {
        use Primitive::*;
        match self {
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Exp => "exp",
            Log => "log",
            Log10 => "log10",
            Sqrt => "sqrt",
            Sinh => "sinh",
            Cosh => "cosh",
            Tanh => "tanh",
            Abs => "abs",
        }
    }

    /// Applique la fonction sur les réels.
    /// Erreur = cause courte (domaine, dépassement), jamais de NaN silencieux.
    pub fn appliquer(self, v: f64) -> Result<f64, String> {
        use Primitive::*;

        let hors_domaine = match self {
            Log | Log10 => v <= 0.0,
            Sqrt => v < 0.0,
            Asin | Acos => !(-1.0..=1.0).contains(&v),
            _ => false,
        };
        if hors_domaine {
            return Err(format!("{}: domaine mathématique", self.nom()));
        }

        let r = match self {
            Sin => v.sin(),
            Cos => v.cos(),
            Tan => v.tan(),
            Asin => v.asin(),
            Acos => v.acos(),
            Atan => v.atan(),
            Exp => v.exp(),
            Log => v.ln(),
            Log10 => v.log10(),
            Sqrt => v.sqrt(),
            Sinh => v.sinh(),
            Cosh => v.cosh(),
            Tanh => v.tanh(),
            Abs => v.abs(),
        };

        if r.is_finite() {
            Ok(r)
        } else {
            Err(format!("{}: dépassement", self.nom()))
        }
    }
}

/// Table explicite nom -> implémentation.
pub struct Environnement {
    fonctions: &'static [(&'static str, Primitive)],
    constantes: &'static [(&'static str, Constante)],
}

pub const ENVIRONNEMENT: Environnement = Environnement {
    fonctions: &[
        ("sin", Primitive::Sin),
        ("cos", Primitive::Cos),
        ("tan", Primitive::Tan),
        ("asin", Primitive::Asin),
        ("acos", Primitive::Acos),
        ("atan", Primitive::Atan),
        ("exp", Primitive::Exp),
        ("log", Primitive::Log),
        ("log10", Primitive::Log10),
        ("sqrt", Primitive::Sqrt),
        ("sinh", Primitive::Sinh),
        ("cosh", Primitive::Cosh),
        ("tanh", Primitive::Tanh),
        ("abs", Primitive::Abs),
    ],
    constantes: &[("pi", Constante::Pi), ("e", Constante::E)],
};

/// Seul nom lié en plus de la table.
pub const VARIABLE: &str = "x";

impl Environnement {
    pub fn fonction(&self, nom: &str) -> Option<Primitive> {
        self.fonctions
            .iter()
            .find(|(n, _)| *n == nom)
            .map(|(_, p)| *p)
    }

    pub fn constante(&self, nom: &str) -> Option<Constante> {
        self.constantes
            .iter()
            .find(|(n, _)| *n == nom)
            .map(|(_, c)| *c)
    }

    pub fn noms_fonctions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fonctions.iter().map(|(n, _)| *n)
    }
}
