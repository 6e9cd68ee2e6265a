// web.rs — Server-rendered HTML browsing pages.
//
// `GET /` lists goals with a division/process/year filter form and
// `GET /metas/{id}` shows one goal. Plain HTML, no JavaScript.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use metas_core::{Catalog, Meta, MetaError, MetaFilter};

use crate::api::{run_blocking, ApiError, FilterParams};
use crate::AppState;

const CSS: &str = r#"
<style>
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; line-height: 1.6; }
    h1, h2 { color: #333; }
    .header { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 30px; }
    form.filters { display: flex; gap: 12px; align-items: end; margin-bottom: 20px; }
    form.filters label { display: flex; flex-direction: column; font-size: 13px; color: #4b5563; }
    table { border-collapse: collapse; width: 100%; }
    th, td { text-align: left; padding: 8px 12px; border-bottom: 1px solid #e5e7eb; }
    th { background: #f9fafb; font-size: 13px; text-transform: uppercase; color: #6b7280; }
    .empty { color: #6b7280; font-style: italic; }
    .meta { color: #6b7280; font-size: 14px; }
    dl { display: grid; grid-template-columns: max-content auto; gap: 6px 24px; }
    dt { font-weight: 600; color: #4b5563; }
</style>
"#;

/// Escape text for HTML element and attribute content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str(CSS);
    html.push_str("</head>\n<body>\n");
    html.push_str(body);
    html.push_str("</body>\n</html>\n");
    html
}

fn select(name: &str, label: &str, options: &[&str], selected: Option<&str>) -> String {
    let mut html = format!("<label>{}<select name=\"{}\">\n<option value=\"\">Todas</option>\n", label, name);
    let selected = selected.map(|s| s.trim().to_lowercase());
    for option in options {
        let is_selected = selected.as_deref() == Some(option.to_lowercase().as_str());
        html.push_str(&format!(
            "<option{}>{}</option>\n",
            if is_selected { " selected" } else { "" },
            escape(option)
        ));
    }
    html.push_str("</select></label>\n");
    html
}

/// Render the goal list page.
pub fn render_list(metas: &[Meta], filter: &MetaFilter) -> String {
    let catalog = Catalog::standard();
    let divisiones: Vec<&str> = catalog.divisiones.iter().map(|d| d.nombre).collect();
    let procesos: Vec<&str> = catalog.procesos.iter().map(|p| p.nombre).collect();

    let mut body = String::from("<div class=\"header\">\n<h1>Metas</h1>\n");
    body.push_str(&format!(
        "<p class=\"meta\">{} metas registradas</p>\n</div>\n",
        metas.len()
    ));

    body.push_str("<form class=\"filters\" method=\"get\" action=\"/\">\n");
    body.push_str(&select("division", "División", &divisiones, filter.division.as_deref()));
    body.push_str(&select("proceso", "Proceso", &procesos, filter.proceso.as_deref()));
    body.push_str(&format!(
        "<label>Año objetivo<input type=\"number\" name=\"anio\" value=\"{}\"></label>\n",
        filter.anio.map(|a| a.to_string()).unwrap_or_default()
    ));
    body.push_str("<button type=\"submit\">Filtrar</button>\n</form>\n");

    if metas.is_empty() {
        body.push_str("<p class=\"empty\">No hay metas que coincidan.</p>\n");
        return page("Metas", &body);
    }

    body.push_str("<table>\n<thead><tr><th>ID</th><th>División</th><th>Proceso</th><th>Indicador</th><th>Línea base</th><th>Fecha objetivo</th><th>Creado por</th></tr></thead>\n<tbody>\n");
    for meta in metas {
        body.push_str(&format!(
            "<tr><td><a href=\"/metas/{id}\">{id}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{} {} ({})</td><td>{}</td><td>{}</td></tr>\n",
            escape(&meta.division),
            escape(&meta.proceso),
            escape(&meta.indicador),
            meta.valor_linea_base,
            escape(meta.unidad.as_deref().unwrap_or("")),
            meta.linea_base_anio,
            meta.fecha_objetivo,
            escape(&meta.creado_por),
            id = meta.id,
        ));
    }
    body.push_str("</tbody>\n</table>\n");
    page("Metas", &body)
}

/// Render a single goal.
pub fn render_detail(meta: &Meta) -> String {
    let mut body = format!(
        "<div class=\"header\">\n<h1>Meta #{}</h1>\n<p class=\"meta\"><a href=\"/\">Volver al listado</a></p>\n</div>\n<dl>\n",
        meta.id
    );
    let rows = [
        ("División", escape(&meta.division)),
        ("Proceso", escape(&meta.proceso)),
        ("Indicador", escape(&meta.indicador)),
        ("Año línea base", meta.linea_base_anio.to_string()),
        ("Valor línea base", meta.valor_linea_base.to_string()),
        ("Unidad", escape(meta.unidad.as_deref().unwrap_or("—"))),
        ("Fecha objetivo", meta.fecha_objetivo.to_string()),
        ("Creado por", escape(&meta.creado_por)),
        ("Creado en", meta.creado_en.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    ];
    for (label, value) in rows {
        body.push_str(&format!("<dt>{}</dt><dd>{}</dd>\n", label, value));
    }
    body.push_str("</dl>\n");
    page(&format!("Meta #{}", meta.id), &body)
}

fn render_not_found(id: i64) -> String {
    page(
        "Meta no encontrada",
        &format!(
            "<div class=\"header\">\n<h1>Meta no encontrada</h1>\n<p>No existe la meta #{}. <a href=\"/\">Volver al listado</a></p>\n</div>\n",
            id
        ),
    )
}

/// `GET /`
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Html<String>, ApiError> {
    let filter = params.to_filter();
    let query = filter.clone();
    let metas = run_blocking(&state, move |service| service.list(&query)).await?;
    Ok(Html(render_list(&metas, &filter)))
}

/// `GET /metas/{id}`
pub async fn detail(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match run_blocking(&state, move |service| service.get(id)).await {
        Ok(meta) => Html(render_detail(&meta)).into_response(),
        Err(ApiError::Meta(MetaError::NotFound(_))) => {
            (StatusCode::NOT_FOUND, Html(render_not_found(id))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
