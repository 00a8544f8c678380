// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use handisup_domain::{Demande, Evenement, PeriodeRh};
use time::Date;
use time::macros::datetime;

pub const REFERENCE_JSON: &str = include_str!("../../../../fixtures/reference.json");

pub fn create_test_demande(demandeur: &str, campagne_id: i64) -> Demande {
    Demande::new(demandeur, campagne_id)
}

pub fn create_test_evenement() -> Evenement {
    let mut evenement: Evenement =
        Evenement::new(10, datetime!(2026-10-20 10:00), datetime!(2026-10-20 12:00));
    evenement.intervenant = Some(String::from("interv"));
    evenement.beneficiaires.insert(String::from("etu1"));
    evenement
}

pub const fn create_test_periode(id: Option<i64>, debut: Date, fin: Date, butoir: Date) -> PeriodeRh {
    PeriodeRh {
        id,
        debut,
        fin,
        butoir,
        envoyee: false,
    }
}
