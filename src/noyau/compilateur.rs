//! Noyau : compilation (pipeline réel)
//!
//! texte -> réécriture ^ en ** -> jetons -> RPN -> arbre brut -> validation
//!       -> Expr -> simplify (repli exact) -> code flottant -> FunctionHandle
//!
//! Le FunctionHandle est immuable et partageable (Arc) : aucun état interne,
//! aucun effet de bord. Chaque appel vérifie domaine, complexe et finitude.

use std::sync::Arc;

use num_traits::ToPrimitive;
use tracing::debug;

use super::erreur::{EvaluationFailed, SyntaxRejected};
use super::expr::Expr;
use super::jetons::{format_tokens, tokenize};
use super::primitives::Primitive;
use super::rpn::{from_rpn, to_rpn};
use super::syntaxe::{valider, OpBinaire};

/// Garde-fou : longueur maximale du texte source (en caractères).
pub const LONGUEUR_MAX: usize = 512;

/// Forme exécutable : littéraux déjà convertis en f64, noms déjà résolus.
#[derive(Clone, Debug)]
enum Code {
    Lit(f64),
    Var,
    Neg(Box<Code>),
    Bin(OpBinaire, Box<Code>, Box<Code>),
    Appel(Primitive, Box<Code>),
}

impl Code {
    fn depuis(e: &Expr) -> Code {
        let bin = |op, a: &Expr, b: &Expr| {
            Code::Bin(op, Box::new(Code::depuis(a)), Box::new(Code::depuis(b)))
        };
        match e {
            // hors de portée d’un f64 => infini, refusé à chaque appel
            Expr::Rat(r) => Code::Lit(r.to_f64().unwrap_or(f64::INFINITY)),
            Expr::Const(c) => Code::Lit(c.valeur()),
            Expr::Var => Code::Var,
            Expr::Neg(a) => Code::Neg(Box::new(Code::depuis(a))),
            Expr::Add(a, b) => bin(OpBinaire::Add, a, b),
            Expr::Sub(a, b) => bin(OpBinaire::Sub, a, b),
            Expr::Mul(a, b) => bin(OpBinaire::Mul, a, b),
            Expr::Div(a, b) => bin(OpBinaire::Div, a, b),
            Expr::Mod(a, b) => bin(OpBinaire::Mod, a, b),
            Expr::Pow(a, b) => bin(OpBinaire::Pow, a, b),
            Expr::Appel(p, a) => Code::Appel(*p, Box::new(Code::depuis(a))),
        }
    }

    fn evaluer(&self, x: f64) -> Result<f64, String> {
        let v = match self {
            Code::Lit(v) => *v,
            Code::Var => x,
            Code::Neg(a) => -a.evaluer(x)?,
            Code::Bin(op, a, b) => {
                let va = a.evaluer(x)?;
                let vb = b.evaluer(x)?;
                appliquer_binaire(*op, va, vb)?
            }
            Code::Appel(p, a) => p.appliquer(a.evaluer(x)?)?,
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err("valeur non finie".into())
        }
    }
}

/// Opérations binaires réelles (sémantique “calculatrice de cours”).
fn appliquer_binaire(op: OpBinaire, a: f64, b: f64) -> Result<f64, String> {
    let r = match op {
        OpBinaire::Add => a + b,
        OpBinaire::Sub => a - b,
        OpBinaire::Mul => a * b,
        OpBinaire::Div => {
            if b == 0.0 {
                return Err("division par zéro".into());
            }
            a / b
        }
        OpBinaire::Mod => {
            if b == 0.0 {
                return Err("modulo par zéro".into());
            }
            // modulo plancher : signe du diviseur
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        OpBinaire::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err("division par zéro".into());
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err("résultat complexe".into());
            }
            a.powf(b)
        }
    };

    if r.is_finite() {
        Ok(r)
    } else {
        Err("dépassement".into())
    }
}

#[derive(Debug)]
struct Compilee {
    source: String,
    expr: Expr,
    code: Code,
}

/// Fonction réelle d’une variable, produite UNIQUEMENT par `compile`.
///
/// Pure : deux appels avec le même x fini donnent la même valeur finie,
/// ou la même `EvaluationFailed`.
#[derive(Clone, Debug)]
pub struct FunctionHandle {
    inner: Arc<Compilee>,
}

impl FunctionHandle {
    /// Évalue f(x). Jamais de NaN ni d’infini en sortie.
    pub fn eval(&self, x: f64) -> Result<f64, EvaluationFailed> {
        self.inner
            .code
            .evaluer(x)
            .map_err(|cause| EvaluationFailed { x, cause })
    }

    /// Texte tel que saisi (après trim).
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// Forme canonique (après repli exact), pour la légende “f(x) = …”.
    pub fn forme(&self) -> String {
        self.inner.expr.to_string()
    }

    pub fn est_constante(&self) -> bool {
        self.inner.expr.est_constante()
    }
}

/// API publique : compile un texte en fonction de x, ou le rejette en bloc.
pub fn compile(texte: &str) -> Result<FunctionHandle, SyntaxRejected> {
    let s = texte.trim();
    if s.is_empty() {
        return Err(SyntaxRejected::new("expression vide"));
    }
    if s.chars().count() > LONGUEUR_MAX {
        return Err(SyntaxRejected::new(format!(
            "expression trop longue (max {LONGUEUR_MAX} caractères)"
        )));
    }

    // 0) Alias textuel : ^ => **
    let reecrit = s.replace('^', "**");

    // 1) Jetons
    let jetons = tokenize(&reecrit)?;

    // 2) RPN
    let rpn = to_rpn(&jetons)?;

    // 3) Arbre brut
    let brut = from_rpn(&rpn)?;

    // 4) Validation (liste blanche) -> Expr
    let expr = valider(&brut)?;

    // 5) Repli exact des constantes
    let expr = expr.simplify();

    // 6) Code flottant
    let code = Code::depuis(&expr);

    debug!(
        source = s,
        jetons = %format_tokens(&jetons),
        forme = %expr,
        "expression compilée"
    );

    Ok(FunctionHandle {
        inner: Arc::new(Compilee {
            source: s.to_string(),
            expr,
            code,
        }),
    })
}
