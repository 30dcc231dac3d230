//! Item lifecycle integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    use crate::{cleanup_item, create_item, http_client, item_url, items_url, unique_payload};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_get_item() {
        let client = http_client();
        let payload = unique_payload("A1", 3);
        let created = create_item(&client, &payload).await;
        let id = created["id"].as_str().expect("id is a string").to_owned();
        assert_eq!(created["description"], payload["description"]);

        let resp = client.get(item_url(&id)).send().await.expect("get item");
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.expect("JSON body");
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["location"], "A1");
        assert_eq!(body["data"]["quantity"], 3);
        assert!(body["errorMessage"].is_null());

        cleanup_item(&client, &id).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_location_on_create() {
        let client = http_client();
        let resp = client
            .post(items_url())
            .json(&unique_payload("A1", 1))
            .send()
            .await
            .expect("create item");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
            .expect("Location header");
        let body: Value = resp.json().await.expect("JSON body");
        let id = body["data"]["id"].as_str().expect("id").to_owned();
        assert_eq!(location, format!("/items/{id}"));

        cleanup_item(&client, &id).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_move_item_between_locations() {
        let client = http_client();
        let payload = unique_payload("A1", 3);
        let created = create_item(&client, &payload).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let moved = json!({
            "description": payload["description"],
            "location": "A2",
            "quantity": 3,
        });
        let resp = client
            .put(item_url(&id))
            .json(&moved)
            .send()
            .await
            .expect("update item");
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = client.get(items_url()).send().await.expect("list items");
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.expect("JSON body");
        let listed = body["data"]
            .as_array()
            .expect("data is an array")
            .iter()
            .find(|item| item["id"] == id.as_str())
            .cloned()
            .expect("updated item is listed");
        assert_eq!(listed["location"], "A2");

        cleanup_item(&client, &id).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_item_once() {
        let client = http_client();
        let created = create_item(&client, &unique_payload("B4", 2)).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let resp = client.delete(item_url(&id)).send().await.expect("delete");
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.expect("JSON body");
        assert_eq!(body["data"]["location"], "B4");

        let resp = client.get(item_url(&id)).send().await.expect("get");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = client.delete(item_url(&id)).send().await.expect("delete");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_not_create_item_on_update_of_unknown_id() {
        let client = http_client();
        let ghost = uuid::Uuid::new_v4().to_string();
        let resp = client
            .put(item_url(&ghost))
            .json(&unique_payload("A1", 1))
            .send()
            .await
            .expect("update");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = client.get(item_url(&ghost)).send().await.expect("get");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
