//! Tests for the XFDU manifest reader.

use array_store::XfduManifest;
use chrono::{Datelike, Timelike};
use product_common::Manifest;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:sentinel-safe="http://www.esa.int/safe/sentinel/1.1"
           xmlns:sentinel3="http://www.esa.int/safe/sentinel/sentinel-3/1.0" xmlns:olci="http://www.esa.int/safe/sentinel/sentinel-3/olci/1.0">
  <informationPackageMap>
    <xfdu:contentUnit unitType="SAFE Archive Information Package" textInfo="SENTINEL-3 OLCI Level 1 Full Resolution Product"/>
  </informationPackageMap>
  <metadataSection>
    <metadataObject ID="acquisitionPeriod" classification="DESCRIPTION" category="DMD">
      <metadataWrap mimeType="text/xml" vocabularyName="Sentinel-SAFE" textInfo="Acquisition Period">
        <xmlData>
          <sentinel-safe:acquisitionPeriod>
            <sentinel-safe:startTime>2016-04-19T10:13:02.123456Z</sentinel-safe:startTime>
            <sentinel-safe:stopTime>2016-04-19T10:16:02.000000Z</sentinel-safe:stopTime>
          </sentinel-safe:acquisitionPeriod>
        </xmlData>
      </metadataWrap>
    </metadataObject>
    <metadataObject ID="generalProductInformation" classification="DESCRIPTION" category="DMD">
      <metadataWrap mimeType="text/xml" vocabularyName="Sentinel-SAFE" textInfo="General Product Information">
        <xmlData>
          <sentinel3:generalProductInformation>
            <sentinel3:productName>S3A_OL_1_EFR____20160419T101302_TEST.SEN3</sentinel3:productName>
            <sentinel3:productType>OL_1_EFR</sentinel3:productType>
            <sentinel3:baselineCollection>004</sentinel3:baselineCollection>
          </sentinel3:generalProductInformation>
        </xmlData>
      </metadataWrap>
    </metadataObject>
    <metadataObject ID="olciProductInformation" classification="DESCRIPTION" category="DMD">
      <metadataWrap mimeType="text/xml" vocabularyName="Sentinel-SAFE" textInfo="OLCI Product Information">
        <xmlData>
          <olci:olciProductInformation>
            <olci:samplingParameters>
              <olci:columnsPerTiePoint>64</olci:columnsPerTiePoint>
              <olci:rowsPerTiePoint>1</olci:rowsPerTiePoint>
            </olci:samplingParameters>
            <olci:imageSize>
              <sentinel3:rows>50</sentinel3:rows>
              <sentinel3:columns>100</sentinel3:columns>
            </olci:imageSize>
            <olci:bandDescriptions>
              <sentinel3:band name="Oa01">
                <sentinel3:centralWavelength>400.000000</sentinel3:centralWavelength>
                <sentinel3:bandwidth>15.000000</sentinel3:bandwidth>
              </sentinel3:band>
            </olci:bandDescriptions>
          </olci:olciProductInformation>
        </xmlData>
      </metadataWrap>
    </metadataObject>
  </metadataSection>
  <dataObjectSection>
    <dataObject ID="Oa01_radianceData">
      <byteStream mimeType="application/x-netcdf" size="1024">
        <fileLocation locatorType="URL" href="./Oa01_radiance.nc"/>
      </byteStream>
    </dataObject>
    <dataObject ID="removedPixelsData">
      <byteStream mimeType="application/x-netcdf" size="512">
        <fileLocation locatorType="URL" href="./removed_pixels.nc"/>
      </byteStream>
    </dataObject>
  </dataObjectSection>
</xfdu:XFDU>
"#;

const ROWS_XPATH: &str = "metadataSection/metadataObject[@ID='olciProductInformation']/metadataWrap/xmlData/olciProductInformation/imageSize/rows";

#[test]
fn test_product_identity() {
    let manifest = XfduManifest::parse(MANIFEST).unwrap();
    assert_eq!(manifest.product_type(), "OL_1_EFR");
    assert_eq!(manifest.baseline_collection(), "004");
    assert_eq!(
        manifest.product_name(),
        "S3A_OL_1_EFR____20160419T101302_TEST.SEN3"
    );
    assert_eq!(
        manifest.description(),
        "SENTINEL-3 OLCI Level 1 Full Resolution Product"
    );
}

#[test]
fn test_start_and_stop_time() {
    let manifest = XfduManifest::parse(MANIFEST).unwrap();
    let start = manifest.start_time().unwrap();
    assert_eq!((start.year(), start.month(), start.day()), (2016, 4, 19));
    assert_eq!((start.hour(), start.minute(), start.second()), (10, 13, 2));
    assert!(manifest.stop_time().unwrap() > start);
}

#[test]
fn test_xpath_int() {
    let manifest = XfduManifest::parse(MANIFEST).unwrap();
    assert_eq!(manifest.xpath_int(ROWS_XPATH).unwrap(), 50);
    assert_eq!(
        manifest
            .xpath_int("/XFDU/metadataSection/metadataObject[@ID='olciProductInformation']/metadataWrap/xmlData/olciProductInformation/samplingParameters/columnsPerTiePoint")
            .unwrap(),
        64
    );

    let missing = manifest.xpath_int("metadataSection/metadataObject[@ID='nope']/x");
    assert!(missing.is_err());
    let not_int = manifest.xpath_int(
        "metadataSection/metadataObject[@ID='generalProductInformation']/metadataWrap/xmlData/generalProductInformation/productType",
    );
    assert!(not_int.is_err());
}

#[test]
fn test_file_names_with_exclusions() {
    let manifest = XfduManifest::parse(MANIFEST).unwrap();
    assert_eq!(
        manifest.file_names(&[]),
        vec!["Oa01_radiance.nc".to_string(), "removed_pixels.nc".to_string()]
    );
    assert_eq!(
        manifest.file_names(&["removedPixelsData".to_string()]),
        vec!["Oa01_radiance.nc".to_string()]
    );
}

#[test]
fn test_metadata_tree() {
    let manifest = XfduManifest::parse(MANIFEST).unwrap();
    let metadata = manifest.metadata();
    assert_eq!(metadata.name, "Manifest");
    assert_eq!(metadata.num_elements(), 3);

    let descriptions = metadata
        .element_at_path(&["olciProductInformation", "bandDescriptions"])
        .unwrap();
    let band = &descriptions.elements[0];
    assert_eq!(band.attribute("name").and_then(|v| v.as_text()), Some("Oa01"));
    assert_eq!(
        band.attribute("bandwidth").and_then(|v| v.as_f64()),
        Some(15.0)
    );
}

#[test]
fn test_manifest_without_product_type_is_rejected() {
    assert!(XfduManifest::parse("<XFDU><metadataSection/></XFDU>").is_err());
    assert!(XfduManifest::parse("<XFDU>").is_err());
}
