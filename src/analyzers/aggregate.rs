use crate::analyzers::destination::resolve_destinations;
use crate::analyzers::types::{
    CostCenter, CostCenterSummary, Counts, GiroReport, GlobalTotals, NormalizedItem,
    ProductSearchIndex, RouteAggregate, RouteSummary, Statistics,
};
use crate::analyzers::utility::pct;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Groups normalized items by route and reduces them into a [`GiroReport`].
///
/// Items without a route are dropped before grouping and do not count
/// anywhere. Routes and cost centers are listed in order of first
/// appearance.
pub fn aggregate_items(items: &[NormalizedItem]) -> GiroReport {
    let in_scope: Vec<&NormalizedItem> = items.iter().filter(|i| !i.route.is_empty()).collect();

    let skipped = items.len() - in_scope.len();
    if skipped > 0 {
        debug!(skipped, "Records without a route excluded");
    }

    let by_route = group_ordered(&in_scope, |item| item.route.as_str());
    let destinations = resolve_destinations(in_scope.iter().copied());

    let routes: Vec<RouteAggregate> = by_route
        .iter()
        .map(|(route, route_items)| {
            let destination = destinations.get(route).copied().unwrap_or_default();
            aggregate_route(route, destination, route_items)
        })
        .collect();

    let per_cost_center: Vec<CostCenterSummary> =
        group_ordered(&in_scope, |item| item.cost_center)
            .into_iter()
            .map(|(cost_center, cc_items)| CostCenterSummary {
                cost_center,
                counts: tally(&cc_items),
            })
            .collect();

    let total_routes = routes.len();
    let routes_completed = routes.iter().filter(|r| r.summary.completed).count();

    debug!(
        routes = total_routes,
        routes_completed,
        cost_centers = per_cost_center.len(),
        "Routes aggregated"
    );

    let totals = GlobalTotals {
        counts: tally(&in_scope),
        total_routes,
        routes_completed,
        routes_incomplete: total_routes - routes_completed,
        route_completion_pct: pct(routes_completed, total_routes),
    };

    let per_route = routes.iter().map(|r| r.summary.clone()).collect();

    GiroReport {
        routes,
        product_search: build_product_index(&in_scope),
        dates: distinct_dates(&in_scope),
        statistics: Statistics {
            totals,
            per_route,
            per_cost_center,
        },
    }
}

fn aggregate_route(route: &str, destination: &str, items: &[&NormalizedItem]) -> RouteAggregate {
    let counts = tally(items);

    let customers: BTreeSet<String> = items
        .iter()
        .map(|i| i.customer.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    let cost_centers: BTreeSet<CostCenter> = items.iter().map(|i| i.cost_center).collect();

    let mut unchecked_items = Vec::new();
    let mut accessory_items = Vec::new();
    let mut crossdock_items = Vec::new();

    for item in items {
        if item.is_accessory {
            accessory_items.push(item.detail());
        } else if item.is_crossdock {
            crossdock_items.push(item.detail());
        } else if !item.is_checked {
            unchecked_items.push(item.detail());
        }
    }

    RouteAggregate {
        summary: RouteSummary {
            route: route.to_string(),
            destination: destination.to_string(),
            counts,
            completed: counts.total > 0 && counts.to_check == 0,
        },
        customers: customers.into_iter().collect(),
        cost_centers: cost_centers.into_iter().collect(),
        unchecked_items,
        accessory_items,
        crossdock_items,
    }
}

/// Counts a group of items. Accessory and crossdock items are set aside
/// first; the rest are either checked or still to check.
pub fn tally(items: &[&NormalizedItem]) -> Counts {
    let total = items.len();
    let accessory = items.iter().filter(|i| i.is_accessory).count();
    let crossdock = items.iter().filter(|i| i.is_crossdock).count();
    let checked = items.iter().filter(|i| i.is_checked).count();

    let non_classified = total - accessory - crossdock;
    let to_check = non_classified.saturating_sub(checked);

    Counts {
        total,
        checked,
        to_check,
        accessory,
        crossdock,
        non_classified,
        percentage: pct(checked, total),
    }
}

/// Reverse index of every item that is not checked, keyed by transformed
/// product code. Accessory and crossdock items are included.
fn build_product_index(items: &[&NormalizedItem]) -> ProductSearchIndex {
    let mut index = ProductSearchIndex::default();

    for item in items {
        if item.is_checked || item.product_code.is_empty() {
            continue;
        }

        *index
            .routes
            .entry(item.product_code.clone())
            .or_default()
            .entry(item.route.clone())
            .or_default() += 1;

        let description = item.description.trim();
        if !description.is_empty() && !index.descriptions.contains_key(&item.product_code) {
            index
                .descriptions
                .insert(item.product_code.clone(), description.to_string());
        }
    }

    index
}

fn distinct_dates(items: &[&NormalizedItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|i| i.launch_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Groups items by `key`, keeping keys in order of first appearance and
/// items in input order within each group.
fn group_ordered<'a, K, F>(items: &[&'a NormalizedItem], key: F) -> Vec<(K, Vec<&'a NormalizedItem>)>
where
    K: Eq + std::hash::Hash + Copy,
    F: Fn(&'a NormalizedItem) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&NormalizedItem>)> = Vec::new();

    for &item in items {
        let k = key(item);
        let slot = *slots.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(item);
    }

    groups
}
