use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use tera::{Context, Tera};

use crate::canvas::{Layer, Map};
use crate::error::Error;

const LEAFLET: &str = "https://unpkg.com/leaflet@1.9.4/dist";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="{{ leaflet | safe }}/leaflet.css">
  <script src="{{ leaflet | safe }}/leaflet.js"></script>
  <style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
  <div id="map"></div>
  <script>
    const data = {{ data | safe }};
    const map = L.map('map').setView(data.view.center, data.view.zoom);
    for (const t of data.tiles) {
      L.tileLayer(t.url, { attribution: t.attribution, maxZoom: t.maxZoom }).addTo(map);
    }
    for (const r of data.routes) {
      L.geoJSON(r.data, { style: r.style }).addTo(map);
    }
    for (const m of data.markers) {
      L.marker(m.position, { title: m.name }).addTo(map).bindPopup(m.popup);
    }
  </script>
</body>
</html>
"#;

const POPUP_TEMPLATE: &str = "<b>Foto {{ name }}</b><br>\
<img src=\"{{ url }}\" alt=\"Foto {{ name }}\" \
style=\"width: {{ width }}px; height: auto; border-radius: 8px; margin-top: 8px;\">";

/// Renders `template` with HTML autoescaping of every unfiltered value.
fn render(template: &str, context: &Context) -> Result<String, Error> {
    Tera::one_off(template, context, true).map_err(|e| Error::Render(e.to_string()))
}

/// Popup body for a photo marker: caption and a scaled image.
pub fn popup_html(name: &str, image_url: &str, width: u32) -> Result<String, Error> {
    let mut context = Context::new();
    context.insert("name", name);
    context.insert("url", image_url);
    context.insert("width", &width);
    render(POPUP_TEMPLATE, &context)
}

/// All overlays of `map` as one collection; markers become `Point` features.
pub fn geojson(map: &Map) -> FeatureCollection {
    let mut features = Vec::new();

    for layer in map.layers().iter() {
        match layer {
            Layer::Tiles(_) => {}
            Layer::Route(route) => features.extend(route.features.features.iter().cloned()),
            Layer::Marker(marker) => {
                let mut properties = JsonObject::new();
                properties.insert("name".to_owned(), json!(marker.name));
                properties.insert("image".to_owned(), json!(marker.image_url));
                features.push(Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Point(vec![
                        marker.position.longitude,
                        marker.position.latitude,
                    ]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                });
            }
        }
    }

    FeatureCollection { bbox: None, features, foreign_members: None }
}

/// Renders a standalone Leaflet page showing `map` at its current view.
pub fn page(map: &Map, title: &str) -> Result<String, Error> {
    let view = map.view();
    let mut tiles = Vec::new();
    let mut routes = Vec::new();
    let mut markers = Vec::new();

    for layer in map.layers().iter() {
        match layer {
            Layer::Tiles(t) => tiles.push(json!({
                "url": t.url_template,
                "attribution": t.attribution,
                "maxZoom": t.max_zoom,
            })),
            Layer::Route(route) => routes.push(json!({
                "data": route.features,
                "style": route.style,
            })),
            Layer::Marker(marker) => markers.push(json!({
                "position": [marker.position.latitude, marker.position.longitude],
                "name": marker.name,
                "popup": marker.popup,
            })),
        }
    }

    let data = json!({
        "view": {
            "center": [view.center.latitude, view.center.longitude],
            "zoom": view.zoom,
        },
        "tiles": tiles,
        "routes": routes,
        "markers": markers,
    });

    // keep "</script>" inside strings from closing the script element
    let data = serde_json::to_string(&data)
        .map_err(|e| Error::Render(e.to_string()))?
        .replace("</", "<\\/");

    let mut context = Context::new();
    context.insert("title", title);
    context.insert("leaflet", LEAFLET);
    context.insert("data", &data);
    render(PAGE_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::TileLayer;
    use crate::photo::Marker;
    use crate::LatLng;

    fn map_with_marker() -> Map {
        let map = Map::new(LatLng::new(4.598056, -74.076667), 13., (800, 600));
        map.add_layer(Layer::Tiles(TileLayer {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_owned(),
            attribution: "OSM".to_owned(),
            max_zoom: 18.,
        }));
        map.add_layer(Layer::Marker(Marker {
            position: LatLng::new(4.7, -74.07),
            name: "imagen1.jpg".to_owned(),
            image_url: "Fotos/imagen1.jpg".to_owned(),
            popup: "<b>Foto imagen1.jpg</b>".to_owned(),
        }));
        map
    }

    #[test]
    fn popup_escapes_names() {
        let popup = popup_html("a<b>.jpg", "Fotos/a<b>.jpg", 300).unwrap();
        assert!(popup.starts_with("<b>Foto a&lt;b&gt;.jpg</b><br>"));
        assert!(popup.contains("src=\"Fotos&#x2F;a&lt;b&gt;.jpg\""));
        assert!(popup.contains("alt=\"Foto a&lt;b&gt;.jpg\""));
        assert!(popup.contains("width: 300px"));
    }

    #[test]
    fn page_embeds_layers() {
        let html = page(&map_with_marker(), "Trip <1>").unwrap();
        assert!(html.contains("<title>Trip &lt;1&gt;</title>"));
        assert!(html.contains("href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\""));
        assert!(html.contains("tile.openstreetmap.org/{z}/{x}/{y}.png"));
        assert!(html.contains("\"center\":[4.598056,-74.076667]"));
        assert!(html.contains("Foto imagen1.jpg<\\/b>"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn markers_export_as_points() {
        let collection = geojson(&map_with_marker());
        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.geometry.as_ref().unwrap().value, Value::Point(vec![-74.07, 4.7]));
        assert_eq!(feature.properties.as_ref().unwrap()["image"], json!("Fotos/imagen1.jpg"));
    }
}
