//! Backend-agnostic behaviour checks for [`StorageDriver`] implementations.
//!
//! Drivers run these from their own tests against a freshly opened instance.
//! The driver must accept `.txt` files and must be empty under `tests/`.

use anyhow::{bail, ensure, Context, Result};
use bytes::Bytes;
use tokio::io::AsyncReadExt;

use super::{FileReader, StorageDriver, StorageError};

/// Contents written by [`round_trip`], one file each / 测试文件内容
pub const SAMPLES: &[&str] = &["hello world"];

fn reader(content: Bytes) -> FileReader {
    Box::new(std::io::Cursor::new(content))
}

async fn read_all(driver: &dyn StorageDriver, path: &str) -> Result<Vec<u8>> {
    let mut file = driver
        .get_file(path)
        .await
        .with_context(|| format!("get {:?}", path))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .await
        .with_context(|| format!("read {:?}", path))?;
    Ok(buf)
}

async fn expect_not_found(driver: &dyn StorageDriver, path: &str) -> Result<()> {
    match driver.get_file(path).await {
        Ok(_) => bail!("expected {:?} to be missing, but it can be read", path),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e).with_context(|| format!("get {:?}: expected not found", path)),
    }
}

/// Run every check / 运行全部检查
pub async fn run(driver: &dyn StorageDriver) -> Result<()> {
    round_trip(driver).await.context("round trip")?;
    rejects_duplicates(driver).await.context("duplicate add")?;
    rejects_unaccepted_extension(driver).await.context("accept list")?;
    Ok(())
}

/// Add a file, read it back byte for byte, remove it, and see it gone.
pub async fn round_trip(driver: &dyn StorageDriver) -> Result<()> {
    for (i, content) in SAMPLES.iter().enumerate() {
        let path = format!("tests/test-{}.txt", i);

        let location = driver
            .add_file(reader(Bytes::from_static(content.as_bytes())), &path)
            .await
            .with_context(|| format!("create {:?}", path))?;
        tracing::debug!(%path, %location, "conformance: file added");
        ensure!(
            location == driver.normalize_path(&[path.as_str()]),
            "add returned {:?}, expected {:?}",
            location,
            driver.normalize_path(&[path.as_str()])
        );

        let got = read_all(driver, &path).await?;
        ensure!(
            got == content.as_bytes(),
            "expected {:?} got {:?}",
            content,
            String::from_utf8_lossy(&got)
        );

        driver
            .remove_file(&path)
            .await
            .with_context(|| format!("remove {:?}", path))?;
        expect_not_found(driver, &path).await?;
    }
    Ok(())
}

/// A second add on the same path is refused and leaves the first content alone.
pub async fn rejects_duplicates(driver: &dyn StorageDriver) -> Result<()> {
    let path = "tests/duplicate.txt";
    driver
        .add_file(reader(Bytes::from_static(b"first")), path)
        .await
        .context("first add")?;

    match driver.add_file(reader(Bytes::from_static(b"second")), path).await {
        Err(StorageError::AlreadyExists(_)) => {}
        Ok(location) => bail!("second add succeeded at {:?}", location),
        Err(e) => return Err(e).context("second add: expected AlreadyExists"),
    }

    let got = read_all(driver, path).await?;
    ensure!(got == b"first", "content changed to {:?}", String::from_utf8_lossy(&got));

    driver.remove_file(path).await.context("cleanup")?;
    Ok(())
}

/// Extensions outside the accept-set are refused and nothing gets stored.
pub async fn rejects_unaccepted_extension(driver: &dyn StorageDriver) -> Result<()> {
    let path = "tests/rejected.conformance";
    ensure!(!driver.accepts(".conformance"), "driver unexpectedly accepts .conformance");

    match driver.add_file(reader(Bytes::from_static(b"nope")), path).await {
        Err(StorageError::InvalidExtension { .. }) => {}
        Ok(location) => bail!("add with rejected extension succeeded at {:?}", location),
        Err(e) => return Err(e).context("expected InvalidExtension"),
    }

    expect_not_found(driver, path).await
}
