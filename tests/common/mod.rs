#![allow(dead_code)]

use cmis_browser::PrefsConfig;
use httpmock::prelude::*;
use httpmock::Mock;

/// `admin:secret`
pub const AUTH_HEADER: &str = "Basic YWRtaW46c2VjcmV0";

pub const SERVICE_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<app:service xmlns:app="http://www.w3.org/2007/app"
             xmlns:atom="http://www.w3.org/2005/Atom"
             xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
             xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/">
  <app:workspace>
    <atom:title>Company Home</atom:title>
    <cmisra:repositoryInfo>
      <cmis:repositoryId>repo-1</cmis:repositoryId>
      <cmis:repositoryName>Company Home</cmis:repositoryName>
    </cmisra:repositoryInfo>
    <app:collection href="BASE/cmis/root">
      <cmisra:collectionType>root</cmisra:collectionType>
    </app:collection>
    <app:collection href="BASE/cmis/query">
      <cmisra:collectionType>query</cmisra:collectionType>
    </app:collection>
    <cmisra:uritemplate>
      <cmisra:template>BASE/cmis/query?q={q}&amp;searchAllVersions={searchAllVersions}&amp;maxItems={maxItems}&amp;skipCount={skipCount}&amp;includeAllowableActions={includeAllowableActions}&amp;includeRelationships={includeRelationships}</cmisra:template>
      <cmisra:type>query</cmisra:type>
      <cmisra:mediatype>application/atom+xml;type=feed</cmisra:mediatype>
    </cmisra:uritemplate>
  </app:workspace>
</app:service>"#;

pub const HELLO_ENTRY: &str = r#"<entry xmlns="http://www.w3.org/2005/Atom"
       xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
       xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/">
    <title>hello.txt</title>
    <id>urn:uuid:hello</id>
    <author><name>admin</name></author>
    <updated>2009-11-03T11:55:39.495Z</updated>
    <content type="text/plain" src="BASE/cmis/content/hello"/>
    <link rel="self" href="BASE/cmis/entry/hello"/>
    <cmisra:object>
      <cmis:properties>
        <cmis:propertyId propertyDefinitionId="cmis:objectTypeId" localName="objectTypeId" displayName="Object Type Id">
          <cmis:value>cmis:document</cmis:value>
        </cmis:propertyId>
        <cmis:propertyId propertyDefinitionId="cmis:baseTypeId" localName="baseTypeId" displayName="Base Type Id">
          <cmis:value>cmis:document</cmis:value>
        </cmis:propertyId>
        <cmis:propertyInteger propertyDefinitionId="cmis:contentStreamLength" localName="contentStreamLength" displayName="Content Stream Length">
          <cmis:value>11</cmis:value>
        </cmis:propertyInteger>
      </cmis:properties>
    </cmisra:object>
</entry>"#;

pub const ROOT_FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/"
      xmlns:cmisra="http://docs.oasis-open.org/ns/cmis/restatom/200908/">
  <title>Company Home</title>
  <entry>
    <title>Sites</title>
    <id>urn:uuid:sites</id>
    <author><name>System</name></author>
    <updated>2009-10-01T08:00:00.000Z</updated>
    <link rel="self" href="BASE/cmis/entry/sites"/>
    <link rel="down" type="application/atom+xml;type=feed" href="BASE/cmis/children/sites"/>
    <link rel="down" type="application/cmistree+xml" href="BASE/cmis/tree/sites"/>
  </entry>
  <entry>
    <title>hello.txt</title>
    <id>urn:uuid:hello</id>
    <author><name>admin</name></author>
    <updated>2009-11-03T11:55:39.495Z</updated>
    <content type="text/plain" src="BASE/cmis/content/hello"/>
    <link rel="self" href="BASE/cmis/entry/hello"/>
    <cmisra:object>
      <cmis:properties>
        <cmis:propertyInteger propertyDefinitionId="cmis:contentStreamLength" localName="contentStreamLength" displayName="Content Stream Length">
          <cmis:value>11</cmis:value>
        </cmis:propertyInteger>
      </cmis:properties>
    </cmisra:object>
  </entry>
</feed>"#;

pub const SITES_FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Sites</title>
  <entry>
    <title>budget.xls</title>
    <id>urn:uuid:budget</id>
    <content type="application/vnd.ms-excel" src="BASE/cmis/content/budget"/>
    <link rel="self" href="BASE/cmis/entry/budget"/>
  </entry>
</feed>"#;

pub fn with_base(xml: &str, server: &MockServer) -> String {
    xml.replace("BASE", &server.base_url())
}

pub fn prefs_for(server: &MockServer, extra: &str) -> PrefsConfig {
    let toml = format!(
        "[server]\nurl = \"{}\"\nuser = \"admin\"\npassword = \"secret\"\n{}",
        server.url("/cmis"),
        extra
    );
    PrefsConfig::from_toml_str(&toml).expect("valid prefs")
}

pub fn mock_atom<'a>(server: &'a MockServer, path: &str, body: &str) -> Mock<'a> {
    let body = with_base(body, server);
    let path = path.to_string();
    server.mock(move |when, then| {
        when.method(GET).path(path).header("authorization", AUTH_HEADER);
        then.status(200)
            .header("content-type", "application/atom+xml;charset=UTF-8")
            .body(body);
    })
}

pub fn mock_service(server: &MockServer) -> Mock<'_> {
    mock_atom(server, "/cmis", SERVICE_DOC)
}
