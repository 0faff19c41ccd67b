// src/app/vue.rs
//
// Vue (UI egui) : natif + web
// ---------------------------
// Objectifs :
// - Même Session (etat.rs) pour natif + wasm
// - Panneau mince : toute décision est prise par Session, ici on affiche et on route les clics
// - Clavier : Enter dans le formulaire ajoute la fonction
//
// Note :
// - Pas de tracé ni d’animation : chiffres, intervalles et message seulement.

use eframe::egui;

use super::etat::{Session, RESOLUTION_COURBE};

/// Pas des boutons de domaine.
const PAS_DOMAINE: f64 = 0.1;

impl Session {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Volume par disques");
                ui.add_space(6.0);

                self.ui_catalogue(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_reglages(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_saisie(ui);

                ui.add_space(8.0);
                Self::champ_monospace(ui, "message_out", self.message(), 2);
            });
    }

    fn ui_catalogue(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            self.bouton_action(ui, "<", "Fonction précédente", Action::Precedente);
            ui.strong(&self.courante().nom);
            self.bouton_action(ui, ">", "Fonction suivante", Action::Suivante);
            ui.label(format!(
                "({}/{})",
                self.indice_courant() + 1,
                self.fonctions().len()
            ));
        });
        ui.monospace(format!("f(x) = {}", self.courante().fonction.forme()));
    }

    fn ui_reglages(&mut self, ui: &mut egui::Ui) {
        let d = self.domaine();

        egui::Grid::new("reglages_disques")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("Début :");
                ui.horizontal(|ui| {
                    self.bouton_action(ui, "-", "Début - 0.1", Action::Domaine(-PAS_DOMAINE, 0.0));
                    ui.monospace(format!("{:.2}", d.start()));
                    self.bouton_action(ui, "+", "Début + 0.1", Action::Domaine(PAS_DOMAINE, 0.0));
                });
                ui.end_row();

                ui.label("Fin :");
                ui.horizontal(|ui| {
                    self.bouton_action(ui, "-", "Fin - 0.1", Action::Domaine(0.0, -PAS_DOMAINE));
                    ui.monospace(format!("{:.2}", d.end()));
                    self.bouton_action(ui, "+", "Fin + 0.1", Action::Domaine(0.0, PAS_DOMAINE));
                });
                ui.end_row();

                ui.label("Tranches :");
                ui.horizontal(|ui| {
                    self.bouton_action(ui, "-10", "Dix tranches de moins", Action::Tranches(-10));
                    self.bouton_action(ui, "-", "Une tranche de moins", Action::Tranches(-1));
                    ui.monospace(format!("{}", self.tranches()));
                    self.bouton_action(ui, "+", "Une tranche de plus", Action::Tranches(1));
                    self.bouton_action(ui, "+10", "Dix tranches de plus", Action::Tranches(10));
                });
                ui.end_row();

                ui.label("Tolérance :");
                let tol = format!("±{}", self.tolerance());
                self.bouton_action(ui, &tol, "Tolérance suivante", Action::Tolerance);
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.horizontal_wrapped(|ui| {
            self.bouton_action(ui, "Raffiner", "Simpson adaptatif", Action::Raffiner);
            self.bouton_action(
                ui,
                "Appliquer",
                "Adopter le nombre de tranches conseillé",
                Action::Appliquer,
            );
            self.bouton_action(ui, "Défaut", "Domaine et tranches par défaut", Action::Reinitialiser);
        });
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("resultats_disques")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Volume (grille) :");
                match self.volume() {
                    Some(v) => ui.monospace(format!("{v:.6}")),
                    None => ui.colored_label(ui.visuals().error_fg_color, "indisponible"),
                };
                ui.end_row();

                ui.label("Rayon max :");
                ui.monospace(format!("{:.4}", self.rayon_max()));
                ui.end_row();

                if let Some(r) = self.adaptatif() {
                    ui.label("Volume (adaptatif) :");
                    ui.monospace(format!("{:.6}", r.volume()));
                    ui.end_row();

                    if let Some(e) = r.error_estimate() {
                        ui.label("Écart avec la grille :");
                        ui.monospace(format!("{e:.3e}"));
                        ui.end_row();
                    }

                    ui.label("Tranches conseillées :");
                    ui.monospace(format!("{}", r.recommended_slices()));
                    ui.end_row();

                    ui.label("Évaluations :");
                    ui.monospace(format!(
                        "{} (profondeur max {})",
                        r.evaluations(),
                        r.profondeur_max_atteinte()
                    ));
                    ui.end_row();
                }
            });

        if let Some(r) = self.adaptatif() {
            egui::CollapsingHeader::new(format!("Intervalles ({})", r.intervals().len()))
                .default_open(false)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("intervalles_scroll")
                        .max_height(180.0)
                        .show(ui, |ui| {
                            for iv in r.intervals() {
                                ui.monospace(format!(
                                    "[{:.4}, {:.4}]  profondeur {}",
                                    iv.start, iv.end, iv.depth
                                ));
                            }
                        });
                });
        }

        if let Err(e) = self.points_courbe(RESOLUTION_COURBE) {
            ui.colored_label(ui.visuals().error_fg_color, e.to_string());
        }
    }

    fn ui_saisie(&mut self, ui: &mut egui::Ui) {
        ui.label("Nouvelle fonction :");

        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.saisie.texte)
                .desired_width(ui.available_width())
                .hint_text("Ex: sin(x)^2 + 0.6*e^(0.5*x)")
                .id_salt("saisie_fonction")
                .code_editor(),
        );
        let mut soumettre = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.horizontal(|ui| {
            ui.label("de");
            ui.add(egui::TextEdit::singleline(&mut self.saisie.debut).desired_width(60.0));
            ui.label("à");
            ui.add(egui::TextEdit::singleline(&mut self.saisie.fin).desired_width(60.0));
            soumettre |= ui.add_sized([72.0, 28.0], egui::Button::new("Ajouter")).clicked();
        });

        if soumettre {
            self.soumettre_saisie();
        }
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add(egui::Button::new(label).min_size(egui::vec2(30.0, 26.0)))
            .on_hover_text(tip);

        if resp.clicked() {
            self.executer(action);
        }
    }

    fn executer(&mut self, action: Action) {
        match action {
            Action::Precedente => self.fonction_precedente(),
            Action::Suivante => self.fonction_suivante(),
            Action::Domaine(a, b) => self.ajuster_domaine(a, b),
            Action::Tranches(n) => self.ajuster_tranches(n),
            Action::Tolerance => self.cycler_tolerance(),
            Action::Raffiner => self.raffiner(),
            Action::Appliquer => self.appliquer_recommandation(),
            Action::Reinitialiser => self.reinitialiser(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Precedente,
    Suivante,
    Domaine(f64, f64),
    Tranches(isize),
    Tolerance,
    Raffiner,
    Appliquer,
    Reinitialiser,
}
