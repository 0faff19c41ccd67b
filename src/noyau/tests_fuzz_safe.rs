//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le compilateur et l’évaluation sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur de génération bornée
//! - budget temps global
//! - on accepte les erreurs attendues (division par zéro, domaine, etc.)
//! - invariant clé : un Ok(v) d’évaluation est toujours fini

use std::time::{Duration, Instant};

use super::compilateur::LONGUEUR_MAX;
use super::compile;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
    fn choisir<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.pick(items.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_cause_attendue(cause: &str) -> bool {
    // Liste blanche : échecs *normaux* d’une fonction arbitraire en un point.
    cause == "division par zéro"
        || cause == "modulo par zéro"
        || cause == "résultat complexe"
        || cause == "valeur non finie"
        || cause == "dépassement"
        || cause.ends_with(": domaine mathématique")
        || cause.ends_with(": dépassement")
}

const POINTS: [f64; 7] = [-3.5, -1.0, -0.25, 0.0, 0.5, 2.0, 9.75];

/// Évalue partout ; chaque sortie est finie ou un échec de la liste blanche,
/// et deux évaluations au même point donnent la même chose.
fn sonder(src: &str) -> (usize, usize) {
    let Ok(h) = compile(src) else {
        return (0, 0);
    };
    let (mut ok, mut err) = (0, 0);
    for x in POINTS {
        let a = h.eval(x);
        let b = h.eval(x);
        assert_eq!(a, b, "non déterministe: {src:?} en {x}");
        match a {
            Ok(v) => {
                assert!(v.is_finite(), "Ok non fini: {src:?} en {x} -> {v}");
                ok += 1;
            }
            Err(e) => {
                assert!(
                    is_cause_attendue(&e.cause),
                    "cause inattendue: {src:?} en {x} -> {}",
                    e.cause
                );
                assert_eq!(e.x, x);
                err += 1;
            }
        }
    }
    (ok, err)
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    // inclut 0 (utile pour les divisions et modulos)
    let s = rng.choisir(&["0", "1", "2", "3", "0.5", "1.25", ".75", "10", "1e2", "2.5e-1"]);
    if rng.pick(4) == 0 {
        format!("{s}/{}", rng.choisir(&["2", "3", "4", "7"]))
    } else {
        s.to_string()
    }
}

fn gen_atome(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 => "x".to_string(),
        2 => "pi".to_string(),
        3 => "e".to_string(),
        _ => gen_nombre(rng),
    }
}

const FONCTIONS: [&str; 14] = [
    "sin", "cos", "tan", "asin", "acos", "atan", "exp", "log", "log10", "sqrt", "sinh", "cosh",
    "tanh", "abs",
];

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atome(rng);
    }

    match rng.pick(10) {
        0 => gen_atome(rng),
        1..=5 => {
            let op = rng.choisir(&["+", "-", "*", "/", "%", "^", "**"]);
            format!(
                "({}{op}{})",
                gen_expr(rng, depth - 1),
                gen_expr(rng, depth - 1)
            )
        }
        6 => format!("-{}", gen_expr(rng, depth - 1)),
        7 => format!("+{}", gen_expr(rng, depth - 1)),
        _ => {
            let f = rng.choisir(&FONCTIONS);
            format!("{f}({})", gen_expr(rng, depth - 1))
        }
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_grammaire_toujours_acceptee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..200 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        assert!(expr.len() <= LONGUEUR_MAX, "générateur trop verbeux");

        let h = compile(&expr).unwrap_or_else(|e| panic!("rejet inattendu: {expr:?} -> {e}"));
        // la forme canonique se recompile à l’identique (si le repli ne l’a pas trop allongée)
        let forme = h.forme();
        if forme.chars().count() <= LONGUEUR_MAX {
            let h2 = compile(&forme).unwrap_or_else(|e| panic!("forme {forme:?}: {e}"));
            assert_eq!(h2.forme(), forme, "forme instable pour {expr:?}");
        }

        let (ok, err) = sonder(&expr);
        seen_ok += ok;
        seen_err += err;
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 100, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucun échec vu: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_bruit_jamais_de_panique() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let alphabet = [
        "x", "y", "1", "0", ".", "e", "pi", "sin", "log", "+", "-", "*", "/", "%", "^", "(", ")",
        ",", " ", "[", "]", ";", "'", "=", "_", "lambda", "os", "é", "\t",
    ];

    let mut rng = Rng::new(0xBADC0DE_u64);
    let mut rejets = 0usize;

    for _ in 0..400 {
        budget(t0, max);

        let k = 1 + rng.pick(24) as usize;
        let src: String = (0..k).map(|_| rng.choisir(&alphabet)).collect();

        match compile(&src) {
            Ok(_) => {
                sonder(&src);
            }
            Err(e) => {
                assert!(!e.raison.is_empty(), "raison vide pour {src:?}");
                // déterminisme du rejet
                assert_eq!(compile(&src).unwrap_err(), e);
                rejets += 1;
            }
        }
    }

    assert!(rejets > 200, "bruit trop souvent accepté: {rejets}");
}

#[test]
fn fuzz_safe_imbrication_bornee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // appels imbriqués au-delà de la limite : rejet propre, pas de débordement de pile
    let profond = format!("{}x{}", "sin(".repeat(100), ")".repeat(100));
    let e = compile(&profond).unwrap_err();
    assert!(e.raison.contains("imbrication"), "{}", e.raison);

    // chaîne d’unaires
    let unaires = format!("{}x", "-".repeat(400));
    assert!(compile(&unaires).is_err());

    // parenthèses seules : pas de nœud, accepté
    let parens = format!("{}x{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(compile(&parens).unwrap().eval(2.0).unwrap(), 2.0);

    budget(t0, max);
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let h = compile(&somme_balancee("x", 64)).unwrap_or_else(|e| panic!("err: {e}"));
    assert_eq!(h.eval(0.5).unwrap(), 32.0);

    // repli exact : 40 × 1/2 = 20
    let h = compile(&somme_balancee("1/2", 40)).unwrap_or_else(|e| panic!("err: {e}"));
    assert!(h.est_constante());
    assert_eq!(h.forme(), "20");

    budget(t0, max);
}

#[test]
fn fuzz_safe_tour_de_puissances_bornee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // chaque "**64" multiplie la taille exacte par 64 : le repli doit s’arrêter
    let mut src = "9".to_string();
    for k in 1..=6 {
        src = format!("({src})**64");
        let h = compile(&src).unwrap_or_else(|e| panic!("k={k}: {e}"));
        let r = h.eval(1.0);
        if k == 1 {
            assert!(r.is_ok(), "9^64 tient dans un f64");
        } else {
            assert_eq!(r.unwrap_err().cause, "dépassement", "k={k}");
        }
        budget(t0, max);
    }
}

#[test]
fn fuzz_safe_chaine_plate_acceptee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);
    let mut rng = Rng::new(0xF1A7_u64);

    for _ in 0..20 {
        // x ± x ± ... : associativité gauche, aucune imbrication réelle
        let mut src = "x".to_string();
        let mut attendu = 1.0_f64;
        for _ in 0..150 {
            if rng.coin() {
                src.push_str("+x");
                attendu += 1.0;
            } else {
                src.push_str("-x");
                attendu -= 1.0;
            }
        }
        assert!(src.len() <= LONGUEUR_MAX);

        let h = compile(&src).unwrap_or_else(|e| panic!("{src:?}: {e}"));
        assert_eq!(h.eval(1.0).unwrap(), attendu);
        budget(t0, max);
    }

    // somme plate de 70 termes
    let h = compile(&vec!["x"; 70].join("+")).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(h.eval(0.5).unwrap(), 35.0);
}
