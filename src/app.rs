// src/app.rs
//
// Volume par disques : module App (racine)
// ----------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter Session (pour main.rs: use volume_disques::app::Session;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Important:
// - Enter est géré dans vue.rs (quand le champ de saisie a le focus).
// - Les flèches ne changent de fonction que si aucun champ texte n’a le focus.

pub mod etat;
pub mod vue;

pub use etat::Session;

use eframe::egui;

impl eframe::App for Session {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let libre = ctx.memory(|m| m.focused().is_none());
        if libre {
            let (gauche, droite) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::ArrowLeft),
                    i.key_pressed(egui::Key::ArrowRight),
                )
            });
            if gauche {
                self.fonction_precedente();
            }
            if droite {
                self.fonction_suivante();
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
