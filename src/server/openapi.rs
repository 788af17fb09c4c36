//! Static OpenAPI 2.0 document for the HTTP routes

use serde_json::{json, Value};

use crate::inference::{FieldType, COMPANY_FIELDS};

fn form_parameters() -> Vec<Value> {
    COMPANY_FIELDS
        .iter()
        .map(|field| {
            let (kind, format) = match field.kind {
                FieldType::Categorical => ("string", None),
                FieldType::Integer => ("integer", Some("int64")),
                FieldType::Float => ("number", Some("double")),
            };
            let mut param = json!({
                "name": field.form_name(),
                "in": "formData",
                "type": kind,
                "required": field.required,
                "description": format!("Value of `{}`", field.column),
            });
            if let Some(format) = format {
                param["format"] = json!(format);
            }
            param
        })
        .collect()
}

fn error_response(description: &str) -> Value {
    json!({ "description": description, "schema": { "$ref": "#/definitions/Error" } })
}

/// The full document served at `/openapi.json`
pub fn openapi_document() -> Value {
    let form = form_parameters();

    json!({
        "swagger": "2.0",
        "info": {
            "title": "Outcome Screener API",
            "description": "Predicts startup outcomes and searches the company dataset.",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "basePath": "/",
        "schemes": ["http"],
        "paths": {
            "/": {
                "get": {
                    "summary": "Home page with company search and the prediction form",
                    "produces": ["text/html"],
                    "responses": { "200": { "description": "HTML page" } }
                }
            },
            "/openapi.json": {
                "get": {
                    "summary": "This document",
                    "produces": ["application/json"],
                    "responses": { "200": { "description": "OpenAPI 2.0 document" } }
                }
            },
            "/predict": {
                "get": {
                    "summary": "Prediction form",
                    "produces": ["text/html"],
                    "responses": { "200": { "description": "HTML form" } }
                },
                "post": {
                    "summary": "Predict funding round/acquisition/IPO vs closed/no event",
                    "consumes": ["application/x-www-form-urlencoded"],
                    "produces": ["application/json"],
                    "parameters": form.clone(),
                    "responses": {
                        "200": {
                            "description": "Predicted label and confidence",
                            "schema": { "$ref": "#/definitions/Prediction" }
                        },
                        "400": error_response("Invalid form input"),
                        "500": error_response("Prediction failed")
                    }
                }
            },
            "/predict/outcomes": {
                "post": {
                    "summary": "Run every per-outcome classifier",
                    "consumes": ["application/x-www-form-urlencoded"],
                    "produces": ["application/json"],
                    "parameters": form,
                    "responses": {
                        "200": {
                            "description": "Prediction and probability per outcome",
                            "schema": { "$ref": "#/definitions/OutcomeResults" }
                        },
                        "400": error_response("Invalid form input"),
                        "500": error_response("Prediction failed")
                    }
                }
            },
            "/search_companies": {
                "get": {
                    "summary": "Case-insensitive substring search on company name",
                    "produces": ["text/html", "application/json"],
                    "parameters": [
                        {
                            "name": "company_name",
                            "in": "query",
                            "type": "string",
                            "required": true,
                            "description": "Substring to look for"
                        },
                        {
                            "name": "format",
                            "in": "query",
                            "type": "string",
                            "enum": ["html", "json"],
                            "required": false,
                            "description": "Response format, HTML table by default"
                        }
                    ],
                    "responses": { "200": { "description": "Matching companies" } }
                }
            },
            "/health": {
                "get": {
                    "summary": "Readiness probe",
                    "produces": ["application/json"],
                    "responses": { "200": { "description": "Service is ready" } }
                }
            }
        },
        "definitions": {
            "Prediction": {
                "type": "object",
                "properties": {
                    "Prediction": { "type": "string" },
                    "Confidence": { "type": "string", "description": "Percentage with two decimals" }
                }
            },
            "OutcomeResults": {
                "type": "object",
                "properties": {
                    "results": {
                        "type": "object",
                        "additionalProperties": {
                            "type": "object",
                            "properties": {
                                "outcome": { "type": "string" },
                                "prediction": { "type": "integer" },
                                "probability": { "type": "number" }
                            }
                        }
                    }
                }
            },
            "Error": {
                "type": "object",
                "properties": { "error": { "type": "string" } }
            }
        }
    })
}
