// src/noyau/expr.rs
//
// Expression VALIDÉE (seule la validation en construit).
// - Rat   : littéral exact
// - Const : pi / e (résolues via l’environnement fermé)
// - Var   : la variable x
// - Appel : primitive de la liste blanche
//
// IMPORTANT (SAFE):
// - simplify() ne replie QUE les sous-arbres purement rationnels.
// - Il ne doit jamais effacer une erreur d’évaluation : 1/0 reste 1/0,
//   (1/x)*0 n’est pas réduit à 0.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::fmt;

use super::primitives::{Constante, Primitive};

/// Exposant entier maximal replié exactement (au-delà : évaluation flottante).
const EXPOSANT_REPLI_MAX: i64 = 64;

/// Taille maximale (en bits, numérateur + dénominateur) d’une puissance repliée.
const BITS_REPLI_MAX: u64 = 4096;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Rat(BigRational),
    Const(Constante),
    Var,

    Neg(Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Mod(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),

    Appel(Primitive, Box<Expr>),
}

impl Expr {
    /// Repliement exact des constantes rationnelles.
    pub fn simplify(self) -> Expr {
        use Expr::*;

        match self {
            Rat(_) | Const(_) | Var => self,

            Neg(a) => match a.simplify() {
                Rat(r) => Rat(-r),
                a => Neg(Box::new(a)),
            },

            Add(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) => Rat(x + y),
                (a, b) => Add(Box::new(a), Box::new(b)),
            },

            Sub(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) => Rat(x - y),
                (a, b) => Sub(Box::new(a), Box::new(b)),
            },

            Mul(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) => Rat(x * y),
                (a, b) => Mul(Box::new(a), Box::new(b)),
            },

            // division par zéro : on garde symbolique (l’évaluation signalera l’erreur)
            Div(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) if !y.is_zero() => Rat(x / y),
                (a, b) => Div(Box::new(a), Box::new(b)),
            },

            Mod(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) if !y.is_zero() => Rat(modulo_plancher(&x, &y)),
                (a, b) => Mod(Box::new(a), Box::new(b)),
            },

            Pow(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(base), Rat(ex)) => match exposant_repliable(&base, &ex) {
                    Some(n) => Rat(rational_pow_int(base, n)),
                    None => Pow(Box::new(Rat(base)), Box::new(Rat(ex))),
                },
                (a, b) => Pow(Box::new(a), Box::new(b)),
            },

            Appel(p, a) => Appel(p, Box::new(a.simplify())),
        }
    }

    /// Vrai si l’expression ne dépend pas de x.
    pub fn est_constante(&self) -> bool {
        use Expr::*;
        match self {
            Var => false,
            Rat(_) | Const(_) => true,
            Neg(a) | Appel(_, a) => a.est_constante(),
            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Mod(a, b) | Pow(a, b) => {
                a.est_constante() && b.est_constante()
            }
        }
    }

    fn precedence(&self) -> u8 {
        use Expr::*;
        match self {
            Add(..) | Sub(..) => 1,
            Mul(..) | Div(..) | Mod(..) => 2,
            Neg(_) => 3,
            Rat(r) if r.is_negative() => 3,
            Pow(..) => 4,
            Rat(_) | Const(_) | Var | Appel(..) => 5,
        }
    }
}

/// Modulo “plancher” : le résultat a le signe du diviseur.
pub fn modulo_plancher(x: &BigRational, y: &BigRational) -> BigRational {
    x - y * (x / y).floor()
}

/// Exposant entier petit, résultat de taille bornée, et pas de 0 ** négatif
/// (erreur à conserver).
fn exposant_repliable(base: &BigRational, ex: &BigRational) -> Option<i64> {
    if !ex.is_integer() {
        return None;
    }
    let n = ex.to_integer().to_i64()?;
    if n.abs() > EXPOSANT_REPLI_MAX {
        return None;
    }
    if base.is_zero() && n < 0 {
        return None;
    }
    let bits = base.numer().bits() + base.denom().bits();
    if bits.saturating_mul(n.unsigned_abs()) > BITS_REPLI_MAX {
        return None;
    }
    Some(n)
}

/// Puissance entière exacte (n peut être négatif, base non nulle dans ce cas).
pub fn rational_pow_int(r: BigRational, n: i64) -> BigRational {
    if n == 0 {
        return BigRational::one();
    }
    let e = n.unsigned_abs() as usize;
    let p = num_traits::pow(r, e);
    if n < 0 {
        p.recip()
    } else {
        p
    }
}

/* ------------------------ Affichage canonique ------------------------ */

/// Rationnel en décimal exact si le dénominateur est de la forme 2^a·5^b, sinon a/b.
fn format_rat(r: &BigRational) -> String {
    if r.is_integer() {
        return format!("{}", r.numer());
    }

    let mut d = r.denom().clone();
    let deux = BigInt::from(2);
    let cinq = BigInt::from(5);
    let mut a: u32 = 0;
    let mut b: u32 = 0;
    while (&d % &deux).is_zero() {
        d /= &deux;
        a += 1;
    }
    while (&d % &cinq).is_zero() {
        d /= &cinq;
        b += 1;
    }
    if !d.is_one() {
        return format!("{}/{}", r.numer(), r.denom());
    }
    let k = a.max(b);

    let echelle = BigInt::from(10).pow(k);
    let scaled = (r * BigRational::from_integer(echelle.clone())).to_integer();
    let neg = scaled.is_negative();
    let abs = scaled.abs();
    let ent = &abs / &echelle;
    let mut frac = (&abs % &echelle).to_str_radix(10);
    while frac.len() < k as usize {
        frac.insert(0, '0');
    }
    if neg {
        format!("-{ent}.{frac}")
    } else {
        format!("{ent}.{frac}")
    }
}

fn ecrire_enfant(f: &mut fmt::Formatter<'_>, e: &Expr, parentheses: bool) -> fmt::Result {
    if parentheses {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;

        let p = self.precedence();
        match self {
            Rat(r) => {
                let s = format_rat(r);
                // fraction non décimale : parenthèses pour rester une seule “valeur”
                if s.contains('/') {
                    write!(f, "({s})")
                } else {
                    write!(f, "{s}")
                }
            }
            Const(c) => write!(f, "{}", c.nom()),
            Var => write!(f, "x"),

            Neg(a) => {
                write!(f, "-")?;
                ecrire_enfant(f, a, a.precedence() <= p)
            }

            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Mod(a, b) => {
                let op = match self {
                    Add(..) => "+",
                    Sub(..) => "-",
                    Mul(..) => "*",
                    Div(..) => "/",
                    _ => "%",
                };
                ecrire_enfant(f, a, a.precedence() < p)?;
                write!(f, " {op} ")?;
                ecrire_enfant(f, b, b.precedence() <= p)
            }

            Pow(a, b) => {
                ecrire_enfant(f, a, a.precedence() <= p)?;
                write!(f, "^")?;
                ecrire_enfant(f, b, b.precedence() < p)
            }

            Appel(prim, a) => write!(f, "{}({a})", prim.nom()),
        }
    }
}
