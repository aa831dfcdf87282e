//! Static OpenAPI 3 description served at `GET /swagger`.

use axum::Json;
use serde_json::{json, Value};

pub async fn openapi() -> Json<Value> {
    Json(document())
}

fn page_params() -> Value {
    json!([
        query_param(
            "limit",
            json!({"type": "integer", "minimum": 0, "maximum": 1000, "default": 50})
        ),
        query_param("offset", json!({"type": "integer", "minimum": 0, "default": 0})),
        query_param("type", json!({"type": "string"})),
        query_param("brand", json!({"type": "string"}))
    ])
}

fn query_param(name: &str, schema: Value) -> Value {
    json!({"name": name, "in": "query", "schema": schema})
}

fn json_body(schema: Value) -> Value {
    json!({"application/json": {"schema": schema}})
}

fn gated(summary: &str, parameters: Value, item: &str, paged: bool) -> Value {
    let mut envelope = json!({
        "type": "object",
        "properties": {
            "data": {"type": "array", "items": schema_ref(item)},
            "count": {"type": "integer"}
        }
    });
    if paged {
        envelope["properties"]["limit"] = json!({"type": "integer"});
        envelope["properties"]["offset"] = json!({"type": "integer"});
    }
    json!({
        "get": {
            "summary": summary,
            "security": [{"bearer": []}],
            "parameters": parameters,
            "responses": {
                "200": {"description": "OK", "content": json_body(envelope)},
                "400": {"$ref": "#/components/responses/Error"},
                "401": {"$ref": "#/components/responses/Error"},
                "500": {"$ref": "#/components/responses/Error"}
            }
        }
    })
}

fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Cosmetics regulatory API",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/healthz": {
                "get": {
                    "summary": "Liveness check",
                    "responses": {"200": {"description": "ok"}}
                }
            },
            "/auth/token": {
                "post": {
                    "summary": "Exchange credentials for a bearer token",
                    "requestBody": {
                        "required": true,
                        "content": json_body(object(&[
                            ("username", "string"),
                            ("password", "string"),
                        ]))
                    },
                    "responses": {
                        "200": {
                            "description": "Token issued",
                            "content": json_body(object(&[
                                ("token", "string"),
                                ("expires_in", "integer"),
                                ("expires_at", "string"),
                            ]))
                        },
                        "400": {"$ref": "#/components/responses/Error"},
                        "401": {"$ref": "#/components/responses/Error"}
                    }
                }
            },
            "/api/sephora/products": gated(
                "Sephora products, paginated",
                page_params(),
                "SephoraProduct",
                true
            ),
            "/api/sephora/products/{id}": {
                "get": {
                    "summary": "One Sephora product",
                    "security": [{"bearer": []}],
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
                    ],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": json_body(schema_ref("SephoraProduct"))
                        },
                        "401": {"$ref": "#/components/responses/Error"},
                        "404": {"$ref": "#/components/responses/Error"}
                    }
                }
            },
            "/api/sephora/brands": gated(
                "Brands ranked by restricted products",
                json!([query_param("limit", json!({"type": "integer", "default": 10}))]),
                "BrandRisk",
                false
            ),
            "/api/sephora/by-type": gated("Risk per product type", json!([]), "TypeRisk", false),
            "/api/skincare/products": gated(
                "Skincare products, paginated",
                page_params(),
                "SkincareProduct",
                true
            ),
            "/api/skincare/cmr": gated(
                "Skincare products with CMR ingredients",
                json!([]),
                "SkincareCmrProduct",
                false
            ),
            "/api/comparaison": gated(
                "Sephora vs Skincare per category",
                json!([]),
                "CatalogComparison",
                false
            )
        },
        "components": {
            "securitySchemes": {
                "bearer": {"type": "http", "scheme": "bearer"}
            },
            "responses": {
                "Error": {
                    "description": "Error envelope",
                    "content": json_body(json!({
                        "type": "object",
                        "properties": {"error": object(&[
                            ("message", "string"),
                            ("type", "string"),
                            ("code", "string"),
                        ])}
                    }))
                }
            },
            "schemas": {
                "SephoraProduct": object(&[
                    ("product_id", "string"), ("product_name", "string"), ("brand_name", "string"),
                    ("product_type", "string"), ("price_usd", "number"), ("rating", "number"),
                    ("restricted_ingredient_count", "integer"), ("cmr_count", "integer"),
                    ("has_restricted_ingredient", "boolean"), ("has_cmr", "boolean"),
                ]),
                "SkincareProduct": object(&[
                    ("brand", "string"), ("product_name", "string"), ("product_type", "string"),
                    ("price", "number"), ("rating", "number"),
                    ("restricted_ingredient_count", "integer"), ("cmr_count", "integer"),
                    ("has_restricted_ingredient", "boolean"), ("has_cmr", "boolean"),
                ]),
                "SkincareCmrProduct": object(&[
                    ("brand", "string"), ("product_name", "string"), ("product_type", "string"),
                    ("price", "number"), ("rating", "number"),
                    ("restricted_ingredient_count", "integer"), ("cmr_count", "integer"),
                ]),
                "BrandRisk": object(&[
                    ("brand_name", "string"), ("total_products", "integer"),
                    ("restricted_products", "integer"), ("cmr_products", "integer"),
                    ("avg_price", "number"),
                ]),
                "TypeRisk": object(&[
                    ("product_type", "string"), ("total_products", "integer"),
                    ("avg_restricted_ingredients", "number"), ("restricted_products", "integer"),
                    ("cmr_products", "integer"), ("pct_restricted", "number"),
                    ("pct_cmr", "number"),
                ]),
                "CatalogComparison": object(&[
                    ("category", "string"), ("total_sephora", "integer"),
                    ("pct_restricted_sephora", "number"), ("avg_price_sephora", "number"),
                    ("total_skincare", "integer"), ("pct_restricted_skincare", "number"),
                    ("avg_price_skincare", "number"),
                ])
            }
        }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({"$ref": format!("#/components/schemas/{}", name)})
}

fn object(fields: &[(&str, &str)]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, ty)| (name.to_string(), json!({"type": ty})))
        .collect();
    json!({"type": "object", "properties": properties})
}
