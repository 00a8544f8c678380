// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::config::Context;
use crate::error::CoreError;
use crate::evenement::periode_de;
use crate::store::Store;
use handisup_audit::{DomainEvent, ResourceKind};
use handisup_domain::{Evenement, PeriodeRh};
use tracing::info;

/// Creates or updates an HR period and re-attributes the events whose
/// period changed.
///
/// Overlap is checked by the caller.
///
/// # Returns
///
/// The stored period and the number of events re-attributed.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn maj_periode(
    store: &mut dyn Store,
    ctx: &Context<'_>,
    periode: PeriodeRh,
) -> Result<(PeriodeRh, usize), CoreError> {
    let periode: PeriodeRh = store.save_periode(periode)?;
    let periodes: Vec<PeriodeRh> = store.periodes()?;

    let mut reattribues: usize = 0;
    for mut evenement in store.evenements()? {
        let periode_id: Option<i64> = periode_de(&periodes, evenement.debut);
        if evenement.periode_id != periode_id {
            evenement.periode_id = periode_id;
            let evenement: Evenement = store.save_evenement(evenement)?;
            ctx.events.publish(DomainEvent::EventModified {
                evenement_id: evenement.id.unwrap_or_default(),
                prior_start: None,
                is_creation: false,
            });
            reattribues += 1;
        }
    }

    info!(
        periode_id = periode.id,
        debut = %periode.debut,
        fin = %periode.fin,
        reattribues,
        "HR period saved"
    );
    ctx.events.publish(DomainEvent::ResourceCollectionModified {
        resource: ResourceKind::PeriodeRh,
    });
    Ok((periode, reattribues))
}
