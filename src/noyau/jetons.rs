// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use super::erreur::SyntaxRejected;

/// Borne sur l’exposant décimal d’un littéral (1e308 reste représentable en f64).
pub const EXPOSANT_LITTERAL_MAX: i64 = 308;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),

    // Fonctions, constantes et variable : le tri se fait à la validation.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow, // ** (et ^ après réécriture)

    LPar,
    RPar,
    Virgule,
}

fn rejet(raison: impl Into<String>) -> SyntaxRejected {
    SyntaxRejected::new(raison)
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - nombres décimaux (ex: 12, 1.5, .5, 2., 3e-2) -> Num exact
/// - opérateurs + - * / % **
/// - parenthèses ( ) et virgule (pour signaler les appels à plusieurs arguments)
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (sensibles à la casse)
///
/// Le `^` doit déjà avoir été réécrit en `**` par l’appelant.
pub fn tokenize(s: &str) -> Result<Vec<Tok>, SyntaxRejected> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                out.push(Tok::LPar);
                i += 1;
                continue;
            }
            ')' => {
                out.push(Tok::RPar);
                i += 1;
                continue;
            }
            ',' => {
                out.push(Tok::Virgule);
                i += 1;
                continue;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '%' => {
                out.push(Tok::Percent);
                i += 1;
                continue;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    out.push(Tok::Pow);
                    i += 2;
                } else {
                    out.push(Tok::Star);
                    i += 1;
                }
                continue;
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    return Err(rejet("opérateur non autorisé '//'"));
                }
                out.push(Tok::Slash);
                i += 1;
                continue;
            }
            _ => {}
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            out.push(Tok::Ident(word));
            continue;
        }

        // Nombre décimal (le '.' seul, sans chiffre derrière, est un accès d’attribut)
        let debut_nombre = c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()));
        if debut_nombre {
            let (r, suivant) = lire_nombre(&chars, i)?;
            out.push(Tok::Num(r));
            i = suivant;
            continue;
        }

        let raison = match c {
            '.' => "accès d’attribut interdit ('.')".to_string(),
            '[' | ']' => "indexation interdite".to_string(),
            ';' => "instructions multiples interdites (';')".to_string(),
            '\'' | '"' => "chaînes de caractères interdites".to_string(),
            '=' | '<' | '>' | '!' | '&' | '|' | '~' | '@' => {
                format!("opérateur non autorisé '{c}'")
            }
            _ => format!("caractère inattendu: '{c}'"),
        };
        return Err(rejet(raison));
    }

    Ok(out)
}

/// Lit un littéral décimal à partir de `i` et renvoie (valeur exacte, index suivant).
fn lire_nombre(chars: &[char], mut i: usize) -> Result<(BigRational, usize), SyntaxRejected> {
    let mut chiffres = String::new();
    let mut decimales: i64 = 0;

    while i < chars.len() && chars[i].is_ascii_digit() {
        chiffres.push(chars[i]);
        i += 1;
    }

    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            chiffres.push(chars[i]);
            decimales += 1;
            i += 1;
        }
    }

    // Exposant SEULEMENT si des chiffres suivent : "2*e" garde la constante e.
    let mut exposant: i64 = 0;
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        let mut negatif = false;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            negatif = chars[j] == '-';
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            let start = j;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            let txt: String = chars[start..j].iter().collect();
            let n: i64 = txt
                .parse()
                .map_err(|_| rejet("littéral hors limites"))?;
            exposant = if negatif { -n } else { n };
            i = j;
        }
    }

    if chiffres.is_empty() {
        return Err(rejet("nombre invalide"));
    }

    let mantisse =
        BigInt::parse_bytes(chiffres.as_bytes(), 10).ok_or_else(|| rejet("nombre invalide"))?;

    let puissance = exposant - decimales;
    if !mantisse.is_zero() && (exposant.abs() > EXPOSANT_LITTERAL_MAX || puissance.abs() > 4096) {
        return Err(rejet("littéral hors limites"));
    }

    let dix = BigInt::from(10);
    let echelle = dix.pow(puissance.unsigned_abs() as u32);
    let r = if puissance >= 0 {
        BigRational::from_integer(mantisse * echelle)
    } else {
        BigRational::new(mantisse, echelle)
    };

    Ok((r, i))
}

/// Format utilitaire (journal) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    fn format_rat(r: &BigRational) -> String {
        let n = r.numer();
        let d = r.denom();
        if d.is_one() {
            format!("{n}")
        } else {
            format!("{n}/{d}")
        }
    }

    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(r) => format_rat(r),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Percent => "%".to_string(),
            Tok::Pow => "**".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Virgule => ",".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
