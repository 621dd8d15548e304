/*!

This is the long-form manual for `attendance_reconcile` and `attendance-report`.

## Input tables

Two tables are read, both with a header row naming the columns. They can be
provided as CSV files or as Excel (`.xlsx`) workbooks.

### Attendance table

One row per student.

| Column                     | Content                                               |
|----------------------------|-------------------------------------------------------|
| `Sr No.`                   | serial number, used to select a student               |
| `Student Name`             |                                                       |
| `Course Category`          | e.g. `Piano`, joins with the roster                   |
| `Package Name`             | free text, e.g. `Grade 2 - 20 classes`                |
| `Start Date`               | `DD-Mon-YYYY`, `DD-Mon` or `DD Mon YYYY`              |
| `End Date`                 | same, or `End Date Not Applicable`                    |
| `Historical Class Count`   | classes taken before the current roster               |
| `Classes Attended to-date` |                                                       |
| `10-Jul`, `12-Jul`, ...    | one column per calendar date                          |

The date columns may appear in any order. Their cells read:
- `1`: attended
- blank: nothing recorded
- anything else (`X`, `0`, ...): absent

A column named like a date but that is not one (`31-Feb`) is dropped and
listed in the warnings of the student.

### Roster table

| Column            | Content                                                      |
|-------------------|--------------------------------------------------------------|
| `CompositeKey`    | student name followed by the course category, e.g. `AshaRaoPiano` |
| `Date of Joining` | `M/D/YYYY`                                                   |

Case and whitespace are ignored when joining.

## Reconciliation

For each student:

1. The date columns are read into a chronological map.
2. The map is cut after the cutoff date: the `End Date`, or the last
   attended date for open-ended packages.
3. Blank Saturdays and Sundays between the start of the reporting period
   (10 July by default) and the last attended date become absences.
4. The cumulative trend and the attended / absent / remaining tally of the
   reporting period are computed.
5. The number of classes of the package is read from its name:
   `... 20 classes` or `8 sessions ...`. When the name does not say, the
   historical count plus the classes attended to date is used instead.
6. The attendance percentage is the classes attended to date over that
   number. 80% and above is `Excellent`, 60% and above `Good`.

## Output

`attendance-report` writes a JSON document:

```text
{
  "students": [
    {
      "studentName": "Asha Rao",
      "totalClasses": 20,
      "classesAttendedToDate": 16,
      "attendancePercentage": 80.0,
      "status": "Excellent",
      "lastAttendedDate": "26-Jul",
      "dateOfJoining": "14/03/2025",
      "windowedTally": { "attended": 3, "absent": 2, "remaining": 0, ... },
      ...
    }
  ]
}
```

*/
