// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> arbre brut (Syntaxe)
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire l’arbre brut, SANS ENCORE juger les noms
//
// Règles:
// - Ident(name) suivi de '(' => appel (le nombre d’arguments est compté)
// - Ident(name) seul         => nom (variable, constante… ou rejet à la validation)
// - +/- quand on n’attend PAS d’opérateur => signe unaire (préfixe)
// - Précédences : + - < * / % < signe unaire < **  (** associatif à droite)
//   donc -x**2 = -(x**2) et 2**-x est accepté.

use num_rational::BigRational;

use super::erreur::SyntaxRejected;
use super::jetons::Tok;
use super::syntaxe::{OpBinaire, OpUnaire, Syntaxe};

#[derive(Clone, Debug, PartialEq)]
pub enum Rpn {
    Num(BigRational),
    Nom(String),
    Unaire(OpUnaire),
    Binaire(OpBinaire),
    Appel(String, usize),
}

/// Pile d’opérateurs du shunting-yard.
#[derive(Clone, Debug)]
enum Op {
    Unaire(OpUnaire),
    Binaire(OpBinaire),
    LPar,
    Appel(String),
}

fn precedence(op: &Op) -> i32 {
    match op {
        Op::Binaire(OpBinaire::Add | OpBinaire::Sub) => 1,
        Op::Binaire(OpBinaire::Mul | OpBinaire::Div | OpBinaire::Mod) => 2,
        Op::Unaire(_) => 3,
        Op::Binaire(OpBinaire::Pow) => 4,
        Op::LPar | Op::Appel(_) => 0,
    }
}

fn rejet(raison: impl Into<String>) -> SyntaxRejected {
    SyntaxRejected::new(raison)
}

fn vers_sortie(op: Op) -> Option<Rpn> {
    match op {
        Op::Unaire(u) => Some(Rpn::Unaire(u)),
        Op::Binaire(b) => Some(Rpn::Binaire(b)),
        Op::LPar | Op::Appel(_) => None,
    }
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Ident("x"), Pow, Num(2), RPar]
///   rpn:    [Nom("x"), Num(2), Binaire(Pow), Appel("sin", 1)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Rpn>, SyntaxRejected> {
    if tokens.is_empty() {
        return Err(rejet("expression vide"));
    }

    let mut out: Vec<Rpn> = Vec::new();
    let mut ops: Vec<Op> = Vec::new();

    // Virgules vues par appel ouvert (pile parallèle aux Op::Appel).
    let mut virgules: Vec<usize> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter le signe unaire et les opérandes manquants.
    let mut prev_was_value = false;

    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        i += 1;

        match tok {
            Tok::Num(r) => {
                if prev_was_value {
                    return Err(rejet("opérateur manquant avant un nombre"));
                }
                out.push(Rpn::Num(r.clone()));
                prev_was_value = true;
            }

            Tok::Ident(name) => {
                if prev_was_value {
                    return Err(rejet(format!("opérateur manquant avant '{name}'")));
                }
                if tokens.get(i) == Some(&Tok::LPar) {
                    // appel : la parenthèse ouvrante appartient à l’appel
                    i += 1;
                    ops.push(Op::Appel(name.clone()));
                    virgules.push(0);
                    prev_was_value = false;
                } else {
                    out.push(Rpn::Nom(name.clone()));
                    prev_was_value = true;
                }
            }

            Tok::LPar => {
                if prev_was_value {
                    return Err(rejet("opérateur manquant avant '('"));
                }
                ops.push(Op::LPar);
                prev_was_value = false;
            }

            Tok::RPar => {
                if !prev_was_value {
                    let raison = match ops.last() {
                        Some(Op::Appel(name)) => format!("appel '{name}()' sans argument"),
                        Some(Op::LPar) => "parenthèses vides".to_string(),
                        _ => "opérande manquant avant ')'".to_string(),
                    };
                    return Err(rejet(raison));
                }

                // dépile jusqu’à '(' ou jusqu’à l’appel
                loop {
                    match ops.pop() {
                        None => return Err(rejet("parenthèse fermante sans ouvrante")),
                        Some(Op::LPar) => break,
                        Some(Op::Appel(name)) => {
                            let n = virgules.pop().unwrap_or(0);
                            out.push(Rpn::Appel(name, n + 1));
                            break;
                        }
                        Some(op) => out.extend(vers_sortie(op)),
                    }
                }

                prev_was_value = true;
            }

            Tok::Virgule => {
                if !prev_was_value {
                    return Err(rejet("argument manquant avant ','"));
                }
                // dépile jusqu’à l’appel ouvert (sans le retirer)
                loop {
                    match ops.last() {
                        Some(Op::Appel(_)) => break,
                        Some(Op::LPar) | None => return Err(rejet("virgule hors d’un appel")),
                        Some(_) => {
                            if let Some(op) = ops.pop() {
                                out.extend(vers_sortie(op));
                            }
                        }
                    }
                }
                if let Some(n) = virgules.last_mut() {
                    *n += 1;
                }
                prev_was_value = false;
            }

            Tok::Plus | Tok::Minus if !prev_was_value => {
                // signe unaire : préfixe, ne dépile rien
                let u = if matches!(tok, Tok::Plus) {
                    OpUnaire::Plus
                } else {
                    OpUnaire::Moins
                };
                ops.push(Op::Unaire(u));
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Percent | Tok::Pow => {
                let bin = match tok {
                    Tok::Plus => OpBinaire::Add,
                    Tok::Minus => OpBinaire::Sub,
                    Tok::Star => OpBinaire::Mul,
                    Tok::Slash => OpBinaire::Div,
                    Tok::Percent => OpBinaire::Mod,
                    _ => OpBinaire::Pow,
                };
                if !prev_was_value {
                    return Err(rejet(format!("opérande manquant avant '{}'", bin.symbole())));
                }

                let courant = Op::Binaire(bin);
                let p_tok = precedence(&courant);
                let droite = bin == OpBinaire::Pow;

                // dépile tant que la précédence/associativité l’exige
                // (bloqué par '(' et par un appel : précédence 0)
                while let Some(top) = ops.last() {
                    let p_top = precedence(top);
                    let doit_pop = if droite { p_top > p_tok } else { p_top >= p_tok };
                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.extend(vers_sortie(op));
                    }
                }

                ops.push(courant);
                prev_was_value = false;
            }
        }
    }

    if !prev_was_value {
        return Err(rejet("expression incomplète (opérande manquant en fin)"));
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        match op {
            Op::LPar | Op::Appel(_) => return Err(rejet("parenthèses non fermées")),
            op => out.extend(vers_sortie(op)),
        }
    }

    Ok(out)
}

/// Construit l’arbre brut à partir d’une RPN.
pub fn from_rpn(rpn: &[Rpn]) -> Result<Syntaxe, SyntaxRejected> {
    let mut st: Vec<Syntaxe> = Vec::new();

    for item in rpn.iter().cloned() {
        match item {
            Rpn::Num(r) => st.push(Syntaxe::Nombre(r)),
            Rpn::Nom(n) => st.push(Syntaxe::Nom(n)),

            Rpn::Unaire(op) => {
                let a = st.pop().ok_or_else(|| rejet("expression invalide"))?;
                st.push(Syntaxe::Unaire(op, Box::new(a)));
            }

            Rpn::Binaire(op) => {
                let b = st.pop().ok_or_else(|| rejet("expression invalide"))?;
                let a = st.pop().ok_or_else(|| rejet("expression invalide"))?;
                st.push(Syntaxe::Binaire(op, Box::new(a), Box::new(b)));
            }

            Rpn::Appel(cible, n) => {
                if st.len() < n {
                    return Err(rejet("appel invalide"));
                }
                let args = st.split_off(st.len() - n);
                st.push(Syntaxe::Appel { cible, args });
            }
        }
    }

    match (st.pop(), st.is_empty()) {
        (Some(racine), true) => Ok(racine),
        _ => Err(rejet("expression invalide")),
    }
}
