// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Context, DirectoryError, DirectoryRecord, EnrollmentError, EnrollmentProvider,
    IdentityProvider, Store, StoreError, WorkflowConfig,
};
use handisup_audit::{Actor, DomainEvent, RecordingEventBus};
use handisup_domain::{
    Beneficiaire, Campagne, Charte, ChampCible, Demande, Etape, Evenement, Inscription,
    InterventionForfait, ModificationEtatDemande, OPTION_ACCOMPAGNEMENT_NON_ID, OptionReponse,
    PeriodeRh, PieceJointeBeneficiaire, ProfilBeneficiaire, QUESTION_ACCOMPAGNEMENT_ID, Question,
    Reponse, Role, TableLiee, TypeDemande, TypeEvenement, Utilisateur,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use time::PrimitiveDateTime;
use time::macros::{date, datetime};

pub const NOW: PrimitiveDateTime = datetime!(2026-10-19 10:00);

pub const CAMPAGNE_ETUDES: i64 = 1;
pub const CAMPAGNE_OPTIONNELLE: i64 = 2;
pub const PROFIL_DYS: i64 = 2;
pub const PROFIL_MOTEUR: i64 = 3;
pub const CHARTE_DYS: i64 = 1;
pub const TYPE_COURS: i64 = 10;
pub const TYPE_FORFAIT: i64 = 11;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub utilisateurs: BTreeMap<String, Utilisateur>,
    pub campagnes: BTreeMap<i64, Campagne>,
    pub types_demande: BTreeMap<i64, TypeDemande>,
    pub profils: BTreeMap<i64, ProfilBeneficiaire>,
    pub chartes: BTreeMap<i64, Charte>,
    pub types_evenement: BTreeMap<i64, TypeEvenement>,
    pub demandes: BTreeMap<i64, Demande>,
    pub modifications: Vec<ModificationEtatDemande>,
    pub beneficiaires: BTreeMap<i64, Beneficiaire>,
    pub pieces_jointes: Vec<PieceJointeBeneficiaire>,
    pub evenements: BTreeMap<i64, Evenement>,
    pub interventions: BTreeMap<i64, InterventionForfait>,
    pub periodes: BTreeMap<i64, PeriodeRh>,
    next_id: i64,
}

fn assign<T>(
    next_id: &mut i64,
    map: &BTreeMap<i64, T>,
    id: Option<i64>,
    kind: &'static str,
) -> Result<i64, StoreError> {
    match id {
        Some(id) if map.contains_key(&id) => Ok(id),
        Some(id) => Err(StoreError::UnknownId { kind, id }),
        None => {
            *next_id += 1;
            Ok(*next_id)
        }
    }
}

impl Store for MemoryStore {
    fn utilisateur(&self, uid: &str) -> Result<Option<Utilisateur>, StoreError> {
        Ok(self.utilisateurs.get(uid).cloned())
    }

    fn utilisateurs(&self) -> Result<Vec<Utilisateur>, StoreError> {
        Ok(self.utilisateurs.values().cloned().collect())
    }

    fn save_utilisateur(&mut self, utilisateur: Utilisateur) -> Result<Utilisateur, StoreError> {
        self.utilisateurs
            .insert(utilisateur.uid.clone(), utilisateur.clone());
        Ok(utilisateur)
    }

    fn campagne(&self, id: i64) -> Result<Option<Campagne>, StoreError> {
        Ok(self.campagnes.get(&id).cloned())
    }

    fn type_demande(&self, id: i64) -> Result<Option<TypeDemande>, StoreError> {
        Ok(self.types_demande.get(&id).cloned())
    }

    fn profil(&self, id: i64) -> Result<Option<ProfilBeneficiaire>, StoreError> {
        Ok(self.profils.get(&id).cloned())
    }

    fn charte(&self, id: i64) -> Result<Option<Charte>, StoreError> {
        Ok(self.chartes.get(&id).cloned())
    }

    fn type_evenement(&self, id: i64) -> Result<Option<TypeEvenement>, StoreError> {
        Ok(self.types_evenement.get(&id).cloned())
    }

    fn demande(&self, id: i64) -> Result<Option<Demande>, StoreError> {
        Ok(self.demandes.get(&id).cloned())
    }

    fn demandes(&self) -> Result<Vec<Demande>, StoreError> {
        Ok(self.demandes.values().cloned().collect())
    }

    fn save_demande(&mut self, mut demande: Demande) -> Result<Demande, StoreError> {
        let id: i64 = assign(&mut self.next_id, &self.demandes, demande.id, "demande")?;
        demande.id = Some(id);
        self.demandes.insert(id, demande.clone());
        Ok(demande)
    }

    fn append_modification(
        &mut self,
        modification: ModificationEtatDemande,
    ) -> Result<(), StoreError> {
        self.modifications.push(modification);
        Ok(())
    }

    fn modifications(&self, demande_id: i64) -> Result<Vec<ModificationEtatDemande>, StoreError> {
        Ok(self
            .modifications
            .iter()
            .filter(|m| m.demande_id == demande_id)
            .cloned()
            .collect())
    }

    fn beneficiaire(&self, id: i64) -> Result<Option<Beneficiaire>, StoreError> {
        Ok(self.beneficiaires.get(&id).cloned())
    }

    fn beneficiaires(&self) -> Result<Vec<Beneficiaire>, StoreError> {
        Ok(self.beneficiaires.values().cloned().collect())
    }

    fn save_beneficiaire(
        &mut self,
        mut beneficiaire: Beneficiaire,
    ) -> Result<Beneficiaire, StoreError> {
        let id: i64 = assign(&mut self.next_id, &self.beneficiaires, beneficiaire.id, "beneficiaire")?;
        beneficiaire.id = Some(id);
        self.beneficiaires
            .insert(id, beneficiaire.clone());
        Ok(beneficiaire)
    }

    fn pieces_jointes(&self, uid: &str) -> Result<Vec<PieceJointeBeneficiaire>, StoreError> {
        Ok(self
            .pieces_jointes
            .iter()
            .filter(|p| p.utilisateur == uid)
            .cloned()
            .collect())
    }

    fn save_piece_jointe(
        &mut self,
        mut piece: PieceJointeBeneficiaire,
    ) -> Result<PieceJointeBeneficiaire, StoreError> {
        self.next_id += 1;
        piece.id = Some(self.next_id);
        self.pieces_jointes.push(piece.clone());
        Ok(piece)
    }

    fn evenement(&self, id: i64) -> Result<Option<Evenement>, StoreError> {
        Ok(self.evenements.get(&id).cloned())
    }

    fn evenements(&self) -> Result<Vec<Evenement>, StoreError> {
        Ok(self.evenements.values().cloned().collect())
    }

    fn save_evenement(&mut self, mut evenement: Evenement) -> Result<Evenement, StoreError> {
        let id: i64 = assign(&mut self.next_id, &self.evenements, evenement.id, "evenement")?;
        evenement.id = Some(id);
        self.evenements
            .insert(id, evenement.clone());
        Ok(evenement)
    }

    fn save_intervention_forfait(
        &mut self,
        mut intervention: InterventionForfait,
    ) -> Result<InterventionForfait, StoreError> {
        let id: i64 = assign(&mut self.next_id, &self.interventions, intervention.id, "intervention_forfait")?;
        intervention.id = Some(id);
        self.interventions
            .insert(id, intervention.clone());
        Ok(intervention)
    }

    fn periodes(&self) -> Result<Vec<PeriodeRh>, StoreError> {
        Ok(self.periodes.values().cloned().collect())
    }

    fn save_periode(&mut self, mut periode: PeriodeRh) -> Result<PeriodeRh, StoreError> {
        let id: i64 = assign(&mut self.next_id, &self.periodes, periode.id, "periode_rh")?;
        periode.id = Some(id);
        self.periodes.insert(id, periode.clone());
        Ok(periode)
    }
}

#[derive(Debug, Default)]
pub struct StubEnrollments {
    pub inscriptions: Vec<Inscription>,
    pub unavailable: bool,
    pub calls: Mutex<usize>,
}

impl StubEnrollments {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl EnrollmentProvider for StubEnrollments {
    fn get_enrollments(
        &self,
        _uid: &str,
        _since: time::Date,
        _until: Option<time::Date>,
    ) -> Result<Vec<Inscription>, EnrollmentError> {
        *self.calls.lock().unwrap() += 1;
        if self.unavailable {
            return Err(EnrollmentError::BackendUnavailable(String::from(
                "connection refused",
            )));
        }
        Ok(self.inscriptions.clone())
    }
}

#[derive(Debug, Default)]
pub struct StubDirectory {
    pub records: Vec<DirectoryRecord>,
    pub unavailable: bool,
    pub last_filter: Mutex<Option<String>>,
}

impl IdentityProvider for StubDirectory {
    fn search_by_handle(
        &self,
        handle: &str,
        _attributes: &[&str],
    ) -> Result<Option<DirectoryRecord>, DirectoryError> {
        if self.unavailable {
            return Err(DirectoryError::Unavailable(String::from("bind failed")));
        }
        Ok(self.records.iter().find(|r| r.uid == handle).cloned())
    }

    fn query(
        &self,
        filter: &str,
        _attributes: &[&str],
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        *self.last_filter.lock().unwrap() = Some(filter.to_string());
        if self.unavailable {
            return Err(DirectoryError::Unavailable(String::from("bind failed")));
        }
        Ok(self.records.clone())
    }
}

pub fn directory_record(uid: &str, nom: &str, prenom: &str) -> DirectoryRecord {
    DirectoryRecord {
        uid: uid.to_string(),
        nom: nom.to_string(),
        prenom: prenom.to_string(),
        email: format!("{uid}@univ.fr"),
    }
}

/// Bus, collaborators and configuration shared by a test.
#[derive(Debug, Default)]
pub struct TestEnv {
    pub bus: RecordingEventBus,
    pub enrollments: StubEnrollments,
    pub config: WorkflowConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctx(&self) -> Context<'_> {
        self.ctx_at(NOW)
    }

    pub fn ctx_at(&self, now: PrimitiveDateTime) -> Context<'_> {
        Context::new(&self.bus, &self.enrollments, &self.config, now)
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.bus.events()
    }
}

pub fn staff() -> Actor {
    Actor::user("gest")
}

pub fn question(id: i64, obligatoire: bool) -> Question {
    Question {
        id,
        libelle: format!("Question {id}"),
        obligatoire,
        champ_cible: None,
        table_liee: None,
        options: Vec::new(),
    }
}

pub fn option(id: i64, questions_liees: Vec<Question>) -> OptionReponse {
    OptionReponse {
        id,
        libelle: format!("Option {id}"),
        questions_liees,
    }
}

fn type_etudes() -> TypeDemande {
    let mut situation: Question = question(1, true);
    situation.options = vec![option(10, vec![question(2, true)]), option(11, Vec::new())];
    let mut telephone: Question = question(3, false);
    telephone.champ_cible = Some(ChampCible::TelPerso);
    let mut typologies: Question = question(4, false);
    typologies.table_liee = Some(TableLiee::TypologieHandicap);
    let mut justificatif: Question = question(5, false);
    justificatif.libelle = String::from("Certificat médical");

    TypeDemande {
        id: 1,
        libelle: String::from("Aménagements d'études"),
        accompagnement_optionnel: false,
        profils: vec![PROFIL_DYS],
        etapes: vec![Etape {
            id: 1,
            libelle: String::from("Situation"),
            questions: vec![situation, telephone, typologies, justificatif],
        }],
    }
}

fn type_optionnel() -> TypeDemande {
    let mut accompagnement: Question = question(QUESTION_ACCOMPAGNEMENT_ID, true);
    accompagnement.options = vec![
        option(41, Vec::new()),
        option(OPTION_ACCOMPAGNEMENT_NON_ID, Vec::new()),
    ];

    TypeDemande {
        id: 2,
        libelle: String::from("Accompagnement sportif"),
        accompagnement_optionnel: true,
        profils: vec![PROFIL_DYS, PROFIL_MOTEUR],
        etapes: vec![Etape {
            id: 2,
            libelle: String::from("Accompagnement"),
            questions: vec![accompagnement],
        }],
    }
}

fn periode(id: i64, debut: time::Date, fin: time::Date, butoir: time::Date) -> PeriodeRh {
    PeriodeRh {
        id: Some(id),
        debut,
        fin,
        butoir,
        envoyee: false,
    }
}

pub fn create_test_store() -> MemoryStore {
    let mut store: MemoryStore = MemoryStore {
        next_id: 100,
        ..MemoryStore::default()
    };

    for (uid, nom, prenom, role) in [
        ("etu1", "Martin", "Léa", None),
        ("etu2", "Bernard", "Hugo", None),
        ("gest", "Petit", "Anne", Some(Role::Gestionnaire)),
        ("interv", "Durand", "Paul", Some(Role::Intervenant)),
    ] {
        let mut utilisateur: Utilisateur =
            Utilisateur::new(uid, nom, prenom, &format!("{uid}@univ.fr"));
        utilisateur.roles.extend(role);
        store.utilisateurs.insert(uid.to_string(), utilisateur);
    }

    store.types_demande.insert(1, type_etudes());
    store.types_demande.insert(2, type_optionnel());
    store.campagnes.insert(
        CAMPAGNE_ETUDES,
        Campagne {
            id: CAMPAGNE_ETUDES,
            type_demande_id: 1,
            libelle: String::from("Campagne 2026"),
            debut: date!(2026 - 05 - 01),
            fin: date!(2026 - 12 - 31),
            annee_cible: Some(2026),
        },
    );
    store.campagnes.insert(
        CAMPAGNE_OPTIONNELLE,
        Campagne {
            id: CAMPAGNE_OPTIONNELLE,
            type_demande_id: 2,
            libelle: String::from("Sport 2026"),
            debut: date!(2026 - 09 - 01),
            fin: date!(2026 - 12 - 31),
            annee_cible: None,
        },
    );

    for (id, libelle, chartes) in [
        (ProfilBeneficiaire::A_DETERMINER, "À déterminer", Vec::new()),
        (PROFIL_DYS, "Troubles dys", vec![CHARTE_DYS]),
        (PROFIL_MOTEUR, "Handicap moteur", Vec::new()),
    ] {
        store.profils.insert(
            id,
            ProfilBeneficiaire {
                id,
                libelle: libelle.to_string(),
                avec_typologie: true,
                chartes,
            },
        );
    }
    store.chartes.insert(
        CHARTE_DYS,
        Charte {
            id: CHARTE_DYS,
            libelle: String::from("Charte d'engagement"),
            contenu: String::from("Je m'engage à prévenir en cas d'absence."),
        },
    );

    for (id, libelle, forfait) in [
        (TYPE_COURS, "Prise de notes", false),
        (TYPE_FORFAIT, "Tutorat forfaitaire", true),
        (TypeEvenement::RENFORT_ID, "Renfort", false),
    ] {
        store.types_evenement.insert(
            id,
            TypeEvenement {
                id,
                libelle: libelle.to_string(),
                forfait,
            },
        );
    }

    store.periodes.insert(
        1,
        periode(
            1,
            date!(2026 - 09 - 01),
            date!(2026 - 09 - 30),
            date!(2026 - 10 - 05),
        ),
    );
    store.periodes.insert(
        2,
        periode(
            2,
            date!(2026 - 10 - 01),
            date!(2026 - 10 - 31),
            date!(2026 - 11 - 05),
        ),
    );

    store
}

pub fn choix(question_id: i64, option: i64) -> Reponse {
    let mut reponse: Reponse = Reponse::new(question_id);
    reponse.options = vec![option];
    reponse
}

pub fn texte(question_id: i64, value: &str) -> Reponse {
    let mut reponse: Reponse = Reponse::new(question_id);
    reponse.commentaire = Some(value.to_string());
    reponse
}

/// Stores a request directly, bypassing the workflow.
pub fn insert_demande(
    store: &mut MemoryStore,
    demandeur: &str,
    campagne_id: i64,
    reponses: Vec<Reponse>,
) -> i64 {
    let mut demande: Demande = Demande::new(demandeur, campagne_id);
    demande.reponses = reponses;
    store.save_demande(demande).unwrap().id.unwrap()
}
