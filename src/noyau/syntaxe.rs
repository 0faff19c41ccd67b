// src/noyau/syntaxe.rs
//
// Arbre syntaxique BRUT (sortie du parse) + passe de validation.
//
// Le parse ne décide rien : un nom reste un nom, un appel reste un appel
// avec tous ses arguments. La validation parcourt l’arbre et refuse tout
// ce qui n’est pas dans la grammaire, puis produit l’Expr validée.
// Un seul rejet suffit : jamais de validation partielle.

use num_rational::BigRational;

use super::erreur::SyntaxRejected;
use super::expr::Expr;
use super::primitives::{ENVIRONNEMENT, VARIABLE};

/// Profondeur maximale d’imbrication acceptée.
///
/// L’opérande gauche d’un `+ - * / %` reste au niveau de son parent : une
/// chaîne plate `x + x + ... + x` n’est bornée que par la longueur du texte.
pub const PROFONDEUR_MAX: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpUnaire {
    Plus,
    Moins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpBinaire {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl OpBinaire {
    pub fn symbole(self) -> &'static str {
        match self {
            OpBinaire::Add => "+",
            OpBinaire::Sub => "-",
            OpBinaire::Mul => "*",
            OpBinaire::Div => "/",
            OpBinaire::Mod => "%",
            OpBinaire::Pow => "**",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Syntaxe {
    Nombre(BigRational),
    Nom(String),
    Unaire(OpUnaire, Box<Syntaxe>),
    Binaire(OpBinaire, Box<Syntaxe>, Box<Syntaxe>),
    Appel { cible: String, args: Vec<Syntaxe> },
}

/// Valide l’arbre brut et construit l’Expr (noms résolus via ENVIRONNEMENT).
pub fn valider(s: &Syntaxe) -> Result<Expr, SyntaxRejected> {
    valider_rec(s, 0)
}

fn valider_rec(s: &Syntaxe, profondeur: usize) -> Result<Expr, SyntaxRejected> {
    if profondeur > PROFONDEUR_MAX {
        return Err(SyntaxRejected::new(format!(
            "imbrication trop profonde (max {PROFONDEUR_MAX})"
        )));
    }
    let p = profondeur + 1;

    match s {
        Syntaxe::Nombre(r) => Ok(Expr::Rat(r.clone())),

        Syntaxe::Nom(nom) => {
            if nom == VARIABLE {
                return Ok(Expr::Var);
            }
            if let Some(c) = ENVIRONNEMENT.constante(nom) {
                return Ok(Expr::Const(c));
            }
            if ENVIRONNEMENT.fonction(nom).is_some() {
                return Err(SyntaxRejected::new(format!(
                    "la fonction '{nom}' doit être appelée, ex: {nom}(x)"
                )));
            }
            Err(SyntaxRejected::new(format!("nom inconnu '{nom}'")))
        }

        Syntaxe::Unaire(op, e) => {
            let e = valider_rec(e, p)?;
            Ok(match op {
                OpUnaire::Plus => e,
                OpUnaire::Moins => Expr::Neg(Box::new(e)),
            })
        }

        Syntaxe::Binaire(op, a, b) => {
            let pg = if *op == OpBinaire::Pow { p } else { profondeur };
            let a = Box::new(valider_rec(a, pg)?);
            let b = Box::new(valider_rec(b, p)?);
            Ok(match op {
                OpBinaire::Add => Expr::Add(a, b),
                OpBinaire::Sub => Expr::Sub(a, b),
                OpBinaire::Mul => Expr::Mul(a, b),
                OpBinaire::Div => Expr::Div(a, b),
                OpBinaire::Mod => Expr::Mod(a, b),
                OpBinaire::Pow => Expr::Pow(a, b),
            })
        }

        Syntaxe::Appel { cible, args } => {
            let Some(prim) = ENVIRONNEMENT.fonction(cible) else {
                let raison = if cible == VARIABLE || ENVIRONNEMENT.constante(cible).is_some() {
                    format!("'{cible}' n’est pas une fonction")
                } else {
                    format!("fonction inconnue '{cible}'")
                };
                return Err(SyntaxRejected::new(raison));
            };

            if args.len() != 1 {
                return Err(SyntaxRejected::new(format!(
                    "'{cible}' attend exactement un argument (reçu {})",
                    args.len()
                )));
            }

            let arg = valider_rec(&args[0], p)?;
            Ok(Expr::Appel(prim, Box::new(arg)))
        }
    }
}
